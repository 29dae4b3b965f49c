use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// The specification of the parameter server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorSpec {
    /// Where completion acks are broadcast to.
    pub broadcast_addr: SocketAddr,
}
