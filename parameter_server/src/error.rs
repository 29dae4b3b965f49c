use std::{error::Error, fmt, io};

use comms::TransportErr;

pub type Result<T> = std::result::Result<T, ServerErr>;

/// Parameter server runtime failures.
#[derive(Debug)]
pub enum ServerErr {
    Io(io::Error),
    Transport(TransportErr),
}

impl fmt::Display for ServerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
        }
    }
}

impl Error for ServerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Transport(e) => Some(e),
        }
    }
}

impl From<io::Error> for ServerErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<TransportErr> for ServerErr {
    fn from(value: TransportErr) -> Self {
        Self::Transport(value)
    }
}

impl From<ServerErr> for io::Error {
    fn from(value: ServerErr) -> Self {
        match value {
            ServerErr::Io(e) => e,
            ServerErr::Transport(e) => e.into(),
        }
    }
}
