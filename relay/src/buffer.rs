use std::{
    collections::{BTreeSet, HashMap},
    fmt::{self, Display},
    num::NonZeroUsize,
};

use comms::{JobId, PartId, RoundId};

use crate::error::AggregationErr;

/// Identifies one aggregation round in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AggKey {
    pub job: JobId,
    pub round: RoundId,
}

impl Display for AggKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.job, self.round)
    }
}

/// What happened to a round after accepting a part into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The round is still missing parts.
    Open { received: usize },
    /// The last missing part arrived, the round was evicted.
    Complete,
}

/// The set of partially aggregated rounds held by a relay.
///
/// A round stays open until `max_parts` distinct parts contributed to it. At most
/// `capacity` rounds can be open at once: a contribution that would open one more is
/// rejected without touching the buffer.
#[derive(Debug)]
pub struct AggregationBuffer {
    max_parts: NonZeroUsize,
    capacity: NonZeroUsize,
    open: HashMap<AggKey, BTreeSet<PartId>>,
}

impl AggregationBuffer {
    pub fn new(max_parts: NonZeroUsize, capacity: NonZeroUsize) -> Self {
        Self {
            max_parts,
            capacity,
            open: HashMap::with_capacity(capacity.get()),
        }
    }

    /// Accepts `part` into the round identified by `key`.
    ///
    /// # Args
    /// * `key` - The round the part belongs to.
    /// * `part` - The contributing part.
    ///
    /// # Returns
    /// The round's progress after the insertion.
    ///
    /// # Errors
    /// `AggregationErr::Overflow` if `key` isn't open and the buffer is full,
    /// `AggregationErr::DuplicatePart` if `part` already contributed to `key`. The buffer is
    /// left untouched in both cases.
    pub fn insert(&mut self, key: AggKey, part: PartId) -> Result<Progress, AggregationErr> {
        if !self.open.contains_key(&key) && self.is_full() {
            return Err(AggregationErr::Overflow {
                key,
                capacity: self.capacity.get(),
            });
        }

        let parts = self.open.entry(key).or_default();
        if !parts.insert(part) {
            return Err(AggregationErr::DuplicatePart { key, part });
        }

        let received = parts.len();
        if received >= self.max_parts.get() {
            self.open.remove(&key);
            return Ok(Progress::Complete);
        }

        Ok(Progress::Open { received })
    }

    /// The parts received so far for `key`, if the round is open.
    pub fn parts(&self, key: &AggKey) -> Option<&BTreeSet<PartId>> {
        self.open.get(key)
    }

    pub fn contains(&self, key: &AggKey) -> bool {
        self.open.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.open.len() >= self.capacity.get()
    }

    pub fn max_parts(&self) -> usize {
        self.max_parts.get()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}
