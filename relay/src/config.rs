use std::{net::SocketAddr, num::NonZeroUsize};

use comms::specs::{BatchPolicy, RelaySpec};

/// The settings a relay runs with.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    max_parts: NonZeroUsize,
    buffer_capacity: NonZeroUsize,
    coordinator_addr: SocketAddr,
    worker_broadcast: Option<SocketAddr>,
    batch_policy: BatchPolicy,
}

impl RelayConfig {
    /// Returns the amount of distinct parts that complete a round.
    pub fn max_parts(&self) -> NonZeroUsize {
        self.max_parts
    }

    /// Returns the amount of rounds that may be open at once.
    pub fn buffer_capacity(&self) -> NonZeroUsize {
        self.buffer_capacity
    }

    pub fn coordinator_addr(&self) -> SocketAddr {
        self.coordinator_addr
    }

    pub fn worker_broadcast(&self) -> Option<SocketAddr> {
        self.worker_broadcast
    }

    pub fn batch_policy(&self) -> BatchPolicy {
        self.batch_policy
    }
}

impl From<RelaySpec> for RelayConfig {
    fn from(spec: RelaySpec) -> Self {
        Self {
            max_parts: spec.max_parts,
            buffer_capacity: spec.buffer_capacity,
            coordinator_addr: spec.coordinator_addr,
            worker_broadcast: spec.worker_broadcast,
            batch_policy: spec.batch_policy,
        }
    }
}
