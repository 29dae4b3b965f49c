/// Counters collected by a relay while it runs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RelayMetrics {
    pub received: u64,
    pub round_acks: u64,
    pub results: u64,
    pub forwarded: u64,
    pub duplicates: u64,
    pub overflows: u64,
    pub malformed: u64,
    pub unexpected: u64,
    pub halted_batches: u64,
}

impl RelayMetrics {
    #[inline]
    pub fn bump_received(&mut self) {
        self.received += 1;
    }

    #[inline]
    pub fn bump_round_acks(&mut self) {
        self.round_acks += 1;
    }

    #[inline]
    pub fn bump_results(&mut self) {
        self.results += 1;
    }

    #[inline]
    pub fn bump_forwarded(&mut self) {
        self.forwarded += 1;
    }

    #[inline]
    pub fn bump_duplicates(&mut self) {
        self.duplicates += 1;
    }

    #[inline]
    pub fn bump_overflows(&mut self) {
        self.overflows += 1;
    }

    #[inline]
    pub fn bump_malformed(&mut self) {
        self.malformed += 1;
    }

    #[inline]
    pub fn bump_unexpected(&mut self) {
        self.unexpected += 1;
    }

    #[inline]
    pub fn bump_halted_batches(&mut self) {
        self.halted_batches += 1;
    }
}
