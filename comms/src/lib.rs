mod deserialize;
pub mod error;
pub mod msg;
mod serialize;
pub mod specs;
mod timer;
pub mod transport;

pub use deserialize::Deserialize;
pub use error::{ParseErr, TransportErr};
pub use msg::{JobId, Msg, PartId, RoundId};
pub use serialize::Serialize;
pub use timer::Timer;
pub use transport::{MemNetwork, MemTransport, Transport, UdpTransport};
