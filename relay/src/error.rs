use std::{error::Error, fmt, io};

use comms::{PartId, TransportErr};

use crate::buffer::AggKey;

/// The relay module's result type.
pub type Result<T> = std::result::Result<T, RelayErr>;

/// Conditions the aggregation buffer reports instead of mutating itself.
///
/// Both are absorbed by the relay: they are logged and counted, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationErr {
    /// Every slot of the buffer holds an open round and `key` would need a new one.
    Overflow { key: AggKey, capacity: usize },
    /// `part` already contributed to the open round `key`.
    DuplicatePart { key: AggKey, part: PartId },
}

impl fmt::Display for AggregationErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow { key, capacity } => write!(
                f,
                "buffer overflow: {capacity} rounds already open, can't open round ({key})"
            ),
            Self::DuplicatePart { key, part } => {
                write!(f, "part duplicate found: part {part} already in round ({key})")
            }
        }
    }
}

impl Error for AggregationErr {}

/// Relay runtime failures.
#[derive(Debug)]
pub enum RelayErr {
    Io(io::Error),
    Transport(TransportErr),
}

impl fmt::Display for RelayErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
        }
    }
}

impl Error for RelayErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Transport(e) => Some(e),
        }
    }
}

impl From<io::Error> for RelayErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<TransportErr> for RelayErr {
    fn from(value: TransportErr) -> Self {
        Self::Transport(value)
    }
}

impl From<RelayErr> for io::Error {
    fn from(value: RelayErr) -> Self {
        match value {
            RelayErr::Io(e) => e,
            RelayErr::Transport(e) => e.into(),
        }
    }
}
