use std::net::SocketAddr;

use comms::{Deserialize, Msg, Serialize, Timer, Transport, transport};
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use super::Result;
use crate::{
    config::WorkerConfig,
    metrics::{WorkerMetrics, WorkerReport},
    session::{Schedule, WorkerSession},
};

/// Infrastructure worker runtime.
///
/// Drives a `WorkerSession` over a datagram transport: the send timer produces
/// contributions towards the relay, inbound acks move the session's windows.
pub struct Worker<T: Transport> {
    session: WorkerSession,
    transport: T,
    timer: Timer,
    metrics: WorkerMetrics,
    tx_buf: Vec<u8>,
}

impl<T: Transport> Worker<T> {
    /// Creates a new `Worker`.
    ///
    /// # Args
    /// * `cfg` - The session configuration.
    /// * `transport` - The bound endpoint to send and receive through.
    ///
    /// # Returns
    /// A new worker instance.
    pub fn new(cfg: WorkerConfig, transport: T) -> Self {
        Self {
            session: WorkerSession::new(cfg),
            transport,
            timer: Timer::new(),
            metrics: WorkerMetrics::default(),
            tx_buf: Vec::new(),
        }
    }

    pub fn session(&self) -> &WorkerSession {
        &self.session
    }

    /// Runs the session until every round is acknowledged or until `token` is cancelled.
    ///
    /// # Args
    /// * `token` - Cancelling it stops the session and drops any pending send.
    ///
    /// # Returns
    /// The final report of the session.
    ///
    /// # Errors
    /// Returns `WorkerErr` on I/O failures of the transport.
    pub async fn run(mut self, token: CancellationToken) -> Result<WorkerReport> {
        let schedule = self.session.start();
        self.apply(schedule);

        let mut rx_buf = Vec::new();

        while !self.session.is_exhausted() {
            tokio::select! {
                _ = token.cancelled() => {
                    let schedule = self.session.stop();
                    self.apply(schedule);
                    break;
                }
                _ = self.timer.fired() => self.send().await?,
                res = self.transport.recv_from(&mut rx_buf) => match res {
                    Ok(from) => self.handle_datagram(&rx_buf, from),
                    Err(e) if transport::is_transient(&e) => warn!("transient receive error: {e}"),
                    Err(e) => return Err(e.into()),
                },
            }
        }

        let cfg = self.session.config();
        info!(
            "worker ({},{}) finished: sent={} last_ack={}",
            cfg.job_id(),
            cfg.part_id(),
            self.session.sent(),
            self.session.last_ack()
        );

        Ok(self.report())
    }

    /// Returns a snapshot of the session's state and counters.
    pub fn report(&self) -> WorkerReport {
        WorkerReport {
            sent: self.session.sent(),
            last_ack: self.session.last_ack(),
            last_completion: self.session.last_completion(),
            exhausted: self.session.is_exhausted(),
            metrics: self.metrics.clone(),
        }
    }

    async fn send(&mut self) -> Result<()> {
        let Some(msg) = self.session.send() else {
            return Ok(());
        };

        self.tx_buf.clear();
        msg.serialize(&mut self.tx_buf);

        let relay_addr = self.session.config().relay_addr();
        self.transport.send_to(&self.tx_buf, relay_addr).await?;
        self.metrics.bump_contributions();
        Ok(())
    }

    fn handle_datagram(&mut self, payload: &[u8], from: SocketAddr) {
        let cfg = self.session.config();
        let (job, part) = (cfg.job_id(), cfg.part_id());

        let msg = match Msg::deserialize(payload) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("worker ({job},{part}) dropping message from {from}: {e}");
                self.metrics.bump_malformed();
                return;
            }
        };

        info!("worker ({job},{part}) received {msg}");

        let schedule = match msg {
            Msg::RoundAck { round } => {
                self.metrics.bump_round_acks();
                self.session.on_round_ack(round)
            }
            Msg::CompletionAck { part: tag, round } => {
                self.metrics.bump_completion_acks();
                self.session.on_completion_ack(tag, round)
            }
            other => {
                warn!(
                    "worker ({job},{part}) unexpected message from {from}: got={}",
                    other.kind()
                );
                self.metrics.bump_unexpected();
                Schedule::Keep
            }
        };

        self.apply(schedule);
    }

    fn apply(&mut self, schedule: Schedule) {
        match schedule {
            Schedule::After(delay) => self.timer.arm(delay),
            Schedule::Cancel => {
                self.timer.cancel();
            }
            Schedule::Keep => {}
        }
    }
}
