//! Best-effort datagram delivery between protocol roles.

mod mem;
mod udp;

use std::{io, net::SocketAddr};

pub use mem::{MemNetwork, MemTransport};
pub use udp::UdpTransport;

/// An unreliable datagram endpoint.
///
/// Delivery is best-effort: datagrams may be lost, and nothing is guaranteed about the
/// ordering between different peers.
#[allow(unused)]
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Sends `payload` as a single datagram to `dst`.
    ///
    /// # Arguments
    /// * `payload` - The datagram's content.
    /// * `dst` - The destination address.
    async fn send_to(&self, payload: &[u8], dst: SocketAddr) -> io::Result<()>;

    /// Waits until a datagram arrives and writes it into `buf`.
    ///
    /// # Arguments
    /// * `buf` - The buffer to receive into, resized to the length of the datagram.
    ///
    /// # Returns
    /// The address of the sender.
    async fn recv_from(&self, buf: &mut Vec<u8>) -> io::Result<SocketAddr>;

    /// Receives an already queued datagram without waiting.
    ///
    /// # Arguments
    /// * `buf` - The buffer to receive into, resized to the length of the datagram.
    ///
    /// # Returns
    /// The address of the sender, or `None` if nothing is queued.
    fn try_recv_from(&self, buf: &mut Vec<u8>) -> io::Result<Option<SocketAddr>>;

    /// The address this endpoint is bound to.
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

/// Whether a receive error only reflects a past send to an unreachable peer.
///
/// Some platforms surface ICMP port unreachable replies on the next receive call of an
/// unconnected socket, those leave the socket perfectly usable.
pub fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset
    )
}
