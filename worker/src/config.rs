use std::{net::SocketAddr, num::NonZeroU32, time::Duration};

use comms::{
    JobId, PartId, RoundId,
    specs::{CompletionPolicy, WorkerSpec},
};

/// Immutable execution bounds for a worker session.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    job_id: JobId,
    part_id: PartId,
    relay_addr: SocketAddr,
    max_rounds: u32,
    interval: Duration,
    ack_window: NonZeroU32,
    relay_window: NonZeroU32,
    completion_policy: CompletionPolicy,
}

impl WorkerConfig {
    /// Returns the job this worker contributes to.
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Returns the part of the job this worker produces.
    pub fn part_id(&self) -> PartId {
        self.part_id
    }

    pub fn relay_addr(&self) -> SocketAddr {
        self.relay_addr
    }

    /// Returns the amount of rounds to contribute, zero means unlimited.
    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Returns the delay between an accepted ack and the next contribution.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn ack_window(&self) -> u32 {
        self.ack_window.get()
    }

    pub fn relay_window(&self) -> u32 {
        self.relay_window.get()
    }

    pub fn completion_policy(&self) -> CompletionPolicy {
        self.completion_policy
    }

    /// Whether `round` is still within the configured amount of rounds.
    pub fn has_round(&self, round: RoundId) -> bool {
        self.max_rounds == 0 || round < self.max_rounds
    }
}

impl From<WorkerSpec> for WorkerConfig {
    fn from(spec: WorkerSpec) -> Self {
        Self {
            job_id: spec.job_id,
            part_id: spec.part_id,
            relay_addr: spec.relay_addr,
            max_rounds: spec.max_rounds,
            interval: Duration::from_millis(spec.interval_ms),
            ack_window: spec.ack_window,
            relay_window: spec.relay_window,
            completion_policy: spec.completion_policy,
        }
    }
}
