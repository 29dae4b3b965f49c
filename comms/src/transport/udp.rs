use std::{io, net::SocketAddr};

use tokio::net::UdpSocket;

use super::Transport;
use crate::error::TransportErr;

/// Largest payload a single udp datagram can carry over ipv4.
const MAX_DATAGRAM: usize = 65_507;

/// A `Transport` over a tokio udp socket.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Binds a new udp socket at `addr` with broadcasting enabled.
    ///
    /// # Arguments
    /// * `addr` - The local address to listen at.
    ///
    /// # Returns
    /// The bound transport or `TransportErr::Bind` if the address can't be taken.
    pub async fn bind(addr: SocketAddr) -> Result<Self, TransportErr> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| TransportErr::Bind { addr, source })?;

        socket.set_broadcast(true)?;
        Ok(Self { socket })
    }
}

impl Transport for UdpTransport {
    async fn send_to(&self, payload: &[u8], dst: SocketAddr) -> io::Result<()> {
        self.socket.send_to(payload, dst).await?;
        Ok(())
    }

    async fn recv_from(&self, buf: &mut Vec<u8>) -> io::Result<SocketAddr> {
        buf.resize(MAX_DATAGRAM, 0);

        let (n, from) = self.socket.recv_from(buf).await?;
        buf.truncate(n);
        Ok(from)
    }

    fn try_recv_from(&self, buf: &mut Vec<u8>) -> io::Result<Option<SocketAddr>> {
        buf.resize(MAX_DATAGRAM, 0);

        match self.socket.try_recv_from(buf) {
            Ok((n, from)) => {
                buf.truncate(n);
                Ok(Some(from))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                buf.clear();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}
