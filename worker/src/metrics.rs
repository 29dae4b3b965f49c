use comms::RoundId;

/// Counters collected by a worker while it runs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkerMetrics {
    pub contributions: u64,
    pub round_acks: u64,
    pub completion_acks: u64,
    pub malformed: u64,
    pub unexpected: u64,
}

impl WorkerMetrics {
    #[inline]
    pub fn bump_contributions(&mut self) {
        self.contributions += 1;
    }

    #[inline]
    pub fn bump_round_acks(&mut self) {
        self.round_acks += 1;
    }

    #[inline]
    pub fn bump_completion_acks(&mut self) {
        self.completion_acks += 1;
    }

    #[inline]
    pub fn bump_malformed(&mut self) {
        self.malformed += 1;
    }

    #[inline]
    pub fn bump_unexpected(&mut self) {
        self.unexpected += 1;
    }
}

/// The final state of a worker session once its driver returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub sent: RoundId,
    pub last_ack: RoundId,
    pub last_completion: RoundId,
    pub exhausted: bool,
    pub metrics: WorkerMetrics,
}
