use std::{
    error::Error,
    fmt::{self, Display},
    io,
    net::SocketAddr,
};

/// The result type for message decoding.
pub type Result<T> = std::result::Result<T, ParseErr>;

/// Error returned whenever an incoming payload can't be decoded into a `Msg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErr {
    NotAscii,
    Empty,
    FieldCount {
        kind: &'static str,
        expected: usize,
        got: usize,
    },
    InvalidId {
        field: &'static str,
        value: String,
    },
}

impl Display for ParseErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAscii => f.write_str("malformed message: payload is not ascii"),
            Self::Empty => f.write_str("malformed message: empty payload"),
            Self::FieldCount {
                kind,
                expected,
                got,
            } => write!(
                f,
                "malformed message: {kind} expects {expected} fields, got {got}"
            ),
            Self::InvalidId { field, value } => {
                write!(f, "malformed message: invalid {field} id {value:?}")
            }
        }
    }
}

impl Error for ParseErr {}

impl From<ParseErr> for io::Error {
    fn from(value: ParseErr) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, value)
    }
}

/// Failures of the datagram transport layer.
#[derive(Debug)]
pub enum TransportErr {
    Bind { addr: SocketAddr, source: io::Error },
    Io(io::Error),
}

impl Display for TransportErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind { addr, source } => write!(f, "failed to bind socket at {addr}: {source}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for TransportErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Bind { source, .. } => Some(source),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<io::Error> for TransportErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<TransportErr> for io::Error {
    fn from(value: TransportErr) -> Self {
        match value {
            TransportErr::Io(e) => e,
            bind => io::Error::other(bind),
        }
    }
}
