use std::{net::SocketAddr, num::NonZeroUsize};

use serde::{Deserialize, Serialize};

const DEFAULT_BUFFER_CAPACITY: NonZeroUsize = NonZeroUsize::new(10).unwrap();

/// What the relay does with the rest of a receive batch after an overflow or after
/// forwarding a completion ack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Stop draining, the queued datagrams are handled by the next receive.
    #[default]
    AbortBatch,
    /// Only the offending datagram is affected, draining goes on.
    DropOne,
}

/// The specification of an aggregating relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaySpec {
    /// The amount of distinct parts that complete a round.
    pub max_parts: NonZeroUsize,
    /// The amount of rounds that may be open at the same time.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: NonZeroUsize,
    /// Where combined results are sent to.
    pub coordinator_addr: SocketAddr,
    /// Where forwarded completion acks are sent to, when unset they are sent to every
    /// worker that contributed so far.
    #[serde(default)]
    pub worker_broadcast: Option<SocketAddr>,
    #[serde(default)]
    pub batch_policy: BatchPolicy,
}

impl RelaySpec {
    /// Creates a spec with every optional field set to its default.
    pub fn new(max_parts: NonZeroUsize, coordinator_addr: SocketAddr) -> Self {
        Self {
            max_parts,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            coordinator_addr,
            worker_broadcast: None,
            batch_policy: BatchPolicy::default(),
        }
    }
}

fn default_buffer_capacity() -> NonZeroUsize {
    DEFAULT_BUFFER_CAPACITY
}
