use std::net::SocketAddr;

use comms::{Serialize, Transport, transport};
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use super::Result;
use crate::{
    metrics::RelayMetrics,
    relay::{Flow, Outgoing, Relay},
};

/// What a single receive invocation went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    /// The amount of datagrams handed to the relay.
    pub handled: usize,
    /// Whether draining stopped before the transport ran dry.
    pub halted: bool,
}

/// Drives a `Relay` over a datagram transport.
///
/// Every receive invocation waits for one datagram and then drains whatever is already
/// queued without waiting, unless the relay halts the batch.
pub struct RelayService<T: Transport> {
    relay: Relay,
    transport: T,
    rx_buf: Vec<u8>,
    tx_buf: Vec<u8>,
    out: Vec<Outgoing>,
}

impl<T: Transport> RelayService<T> {
    pub fn new(relay: Relay, transport: T) -> Self {
        Self {
            relay,
            transport,
            rx_buf: Vec::new(),
            tx_buf: Vec::new(),
            out: Vec::new(),
        }
    }

    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    /// Serves datagrams until `token` is cancelled.
    ///
    /// # Returns
    /// The relay's counters at shutdown.
    ///
    /// # Errors
    /// Returns `RelayErr` on non transient I/O failures of the transport.
    pub async fn run(mut self, token: CancellationToken) -> Result<RelayMetrics> {
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

            self.drain(from).await?;
        }

        let metrics = self.relay.metrics().clone();
        info!(
            "relay stopping: received={} results={} forwarded={} overflows={}",
            metrics.received, metrics.results, metrics.forwarded, metrics.overflows
        );

        Ok(metrics)
    }

    /// Performs a single receive invocation.
    ///
    /// # Errors
    /// Returns `RelayErr` on I/O failures of the transport.
    pub async fn receive_batch(&mut self) -> Result<Batch> {
        let from = self.transport.recv_from(&mut self.rx_buf).await?;
        self.drain(from).await
    }

    async fn drain(&mut self, first: SocketAddr) -> Result<Batch> {
        let mut from = first;
        let mut handled = 0;

        loop {
            let flow = self.relay.on_message(&self.rx_buf, from, &mut self.out);
            handled += 1;
            self.flush().await?;

            if flow == Flow::Halt {
                debug!("batch halted after {handled} datagrams");
                return Ok(Batch {
                    handled,
                    halted: true,
                });
            }

            match self.transport.try_recv_from(&mut self.rx_buf) {
                Ok(Some(next)) => from = next,
                Ok(None) => break,
                Err(e) if transport::is_transient(&e) => {
                    warn!("transient receive error: {e}");
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Batch {
            handled,
            halted: false,
        })
    }

    async fn flush(&mut self) -> Result<()> {
        for Outgoing { msg, dst } in self.out.drain(..) {
            self.tx_buf.clear();
            msg.serialize(&mut self.tx_buf);

            if let Err(e) = self.transport.send_to(&self.tx_buf, dst).await {
                if !transport::is_transient(&e) {
                    return Err(e.into());
                }
                warn!("transient error sending {msg} to {dst}: {e}");
            }
        }

        Ok(())
    }
}
