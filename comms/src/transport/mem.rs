use std::{
    collections::HashMap,
    io,
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};

use log::debug;
use parking_lot::Mutex;
use tokio::sync::{
    self,
    mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError},
};

use super::Transport;
use crate::error::TransportErr;

type Datagram = (Vec<u8>, SocketAddr);

/// An in-process datagram network.
///
/// Endpoints bound on the same `MemNetwork` can exchange datagrams by address. Sending to
/// an address nobody is bound to drops the datagram, sending to `255.255.255.255:port`
/// delivers a copy to every other endpoint bound on `port`.
#[derive(Debug, Clone, Default)]
pub struct MemNetwork {
    endpoints: Arc<Mutex<HashMap<SocketAddr, UnboundedSender<Datagram>>>>,
}

impl MemNetwork {
    /// Creates a new empty `MemNetwork`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a new endpoint at `addr`.
    ///
    /// # Arguments
    /// * `addr` - The address of the new endpoint.
    ///
    /// # Returns
    /// The endpoint or `TransportErr::Bind` if `addr` is already taken.
    pub fn bind(&self, addr: SocketAddr) -> Result<MemTransport, TransportErr> {
        let mut endpoints = self.endpoints.lock();

        if endpoints.contains_key(&addr) {
            let source = io::Error::from(io::ErrorKind::AddrInUse);
            return Err(TransportErr::Bind { addr, source });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        endpoints.insert(addr, tx);

        Ok(MemTransport {
            addr,
            net: self.clone(),
            rx: sync::Mutex::new(rx),
        })
    }

    fn deliver(&self, payload: &[u8], from: SocketAddr, dst: SocketAddr) {
        let endpoints = self.endpoints.lock();

        if dst.ip() == Ipv4Addr::BROADCAST {
            let peers = endpoints
                .iter()
                .filter(|(addr, _)| addr.port() == dst.port() && **addr != from);

            for (_, tx) in peers {
                let _ = tx.send((payload.to_vec(), from));
            }

            return;
        }

        match endpoints.get(&dst) {
            Some(tx) => {
                let _ = tx.send((payload.to_vec(), from));
            }
            None => debug!("dropping datagram from {from} to unbound address {dst}"),
        }
    }

    fn unbind(&self, addr: SocketAddr) {
        self.endpoints.lock().remove(&addr);
    }
}

/// An endpoint bound on a `MemNetwork`.
#[derive(Debug)]
pub struct MemTransport {
    addr: SocketAddr,
    net: MemNetwork,
    rx: sync::Mutex<UnboundedReceiver<Datagram>>,
}

impl MemTransport {
    fn closed<T>() -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "the endpoint was unbound from its network",
        ))
    }
}

impl Transport for MemTransport {
    async fn send_to(&self, payload: &[u8], dst: SocketAddr) -> io::Result<()> {
        self.net.deliver(payload, self.addr, dst);
        Ok(())
    }

    async fn recv_from(&self, buf: &mut Vec<u8>) -> io::Result<SocketAddr> {
        let mut rx = self.rx.lock().await;

        let Some((payload, from)) = rx.recv().await else {
            return Self::closed();
        };

        buf.clear();
        buf.extend_from_slice(&payload);
        Ok(from)
    }

    fn try_recv_from(&self, buf: &mut Vec<u8>) -> io::Result<Option<SocketAddr>> {
        buf.clear();

        let Ok(mut rx) = self.rx.try_lock() else {
            return Ok(None);
        };

        match rx.try_recv() {
            Ok((payload, from)) => {
                buf.extend_from_slice(&payload);
                Ok(Some(from))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Self::closed(),
        }
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        Ok(self.addr)
    }
}

impl Drop for MemTransport {
    fn drop(&mut self) {
        self.net.unbind(self.addr);
    }
}
