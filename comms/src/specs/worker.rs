use std::{net::SocketAddr, num::NonZeroU32};

use serde::{Deserialize, Serialize};

use crate::msg::{JobId, PartId};

const DEFAULT_MAX_ROUNDS: u32 = 100;
const DEFAULT_INTERVAL_MS: u64 = 1000;
const DEFAULT_ACK_WINDOW: NonZeroU32 = NonZeroU32::new(15).unwrap();
const DEFAULT_RELAY_WINDOW: NonZeroU32 = NonZeroU32::new(5).unwrap();

/// How a worker reacts to completion acks broadcast by the coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Completion acks are logged but never move the completion watermark, pacing is
    /// governed by the relay window until the ack window is exhausted.
    #[default]
    Frozen,
    /// Completion acks advance the completion watermark and may resume a stalled worker.
    Advance,
}

/// The specification of a single worker session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSpec {
    pub job_id: JobId,
    pub part_id: PartId,
    /// Where contributions are sent to.
    pub relay_addr: SocketAddr,
    /// The amount of rounds to contribute, zero means unlimited.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    /// The pacing delay between an ack and the next contribution.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Bound on how far ahead of the last completed round the worker may send.
    #[serde(default = "default_ack_window")]
    pub ack_window: NonZeroU32,
    /// Bound on how far ahead of the last acknowledged round the worker may send.
    #[serde(default = "default_relay_window")]
    pub relay_window: NonZeroU32,
    #[serde(default)]
    pub completion_policy: CompletionPolicy,
}

impl WorkerSpec {
    /// Creates a spec with every optional field set to its default.
    pub fn new(job_id: JobId, part_id: PartId, relay_addr: SocketAddr) -> Self {
        Self {
            job_id,
            part_id,
            relay_addr,
            max_rounds: DEFAULT_MAX_ROUNDS,
            interval_ms: DEFAULT_INTERVAL_MS,
            ack_window: DEFAULT_ACK_WINDOW,
            relay_window: DEFAULT_RELAY_WINDOW,
            completion_policy: CompletionPolicy::default(),
        }
    }
}

fn default_max_rounds() -> u32 {
    DEFAULT_MAX_ROUNDS
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

fn default_ack_window() -> NonZeroU32 {
    DEFAULT_ACK_WINDOW
}

fn default_relay_window() -> NonZeroU32 {
    DEFAULT_RELAY_WINDOW
}
