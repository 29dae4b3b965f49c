use std::net::SocketAddr;

use comms::{Msg, Serialize, Transport, transport};
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use super::Result;
use crate::coordinator::{Coordinator, CoordinatorMetrics};

/// Serves a `Coordinator` over a datagram transport.
///
/// Completion acks are sent to a single configured address, usually a broadcast one.
pub struct ParameterServer<T: Transport> {
    coordinator: Coordinator,
    transport: T,
    broadcast_addr: SocketAddr,
    rx_buf: Vec<u8>,
    tx_buf: Vec<u8>,
}

impl<T: Transport> ParameterServer<T> {
    /// Creates a new `ParameterServer`.
    ///
    /// # Args
    /// * `transport` - The bound endpoint records arrive at.
    /// * `broadcast_addr` - Where completion acks are sent to.
    pub fn new(transport: T, broadcast_addr: SocketAddr) -> Self {
        Self {
            coordinator: Coordinator::new(),
            transport,
            broadcast_addr,
            rx_buf: Vec::new(),
            tx_buf: Vec::new(),
        }
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Serves records until `token` is cancelled.
    ///
    /// # Returns
    /// The coordinator's counters at shutdown.
    ///
    /// # Errors
    /// Returns `ServerErr` on non transient I/O failures of the transport.
    pub async fn run(mut self, token: CancellationToken) -> Result<CoordinatorMetrics> {
        loop {
            let res = tokio::select! {
                _ = token.cancelled() => break,
                res = self.transport.recv_from(&mut self.rx_buf) => res,
            };

            let from = match res {
                Ok(from) => from,
                Err(e) if transport::is_transient(&e) => {
                    warn!("transient receive error: {e}");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if let Some(ack) = self.coordinator.on_message(&self.rx_buf, from) {
                self.broadcast(ack).await?;
            }
        }

        let metrics = self.coordinator.metrics().clone();
        info!(
            "parameter server stopping: completed={} received={}",
            metrics.completed, metrics.received
        );

        Ok(metrics)
    }

    async fn broadcast(&mut self, ack: Msg) -> Result<()> {
        self.tx_buf.clear();
        ack.serialize(&mut self.tx_buf);

        match self.transport.send_to(&self.tx_buf, self.broadcast_addr).await {
            Ok(()) => Ok(()),
            Err(e) if transport::is_transient(&e) => {
                warn!("transient error sending {ack} to {}: {e}", self.broadcast_addr);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
