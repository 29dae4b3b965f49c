use std::{collections::BTreeSet, net::SocketAddr};

use comms::{Deserialize, JobId, Msg, PartId, RoundId, specs::BatchPolicy};
use log::{debug, info, warn};

use crate::{
    buffer::{AggKey, AggregationBuffer, Progress},
    config::RelayConfig,
    error::AggregationErr,
    metrics::RelayMetrics,
};

/// A message the relay wants delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outgoing {
    pub msg: Msg,
    pub dst: SocketAddr,
}

/// Whether the rest of the current receive batch should still be drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Halt,
}

/// The aggregating relay between the workers and the coordinator.
///
/// It does no I/O: every datagram is handed to `on_message`, which pushes the messages
/// to send into `out` and tells the caller whether to keep draining.
#[derive(Debug)]
pub struct Relay {
    cfg: RelayConfig,
    buffer: AggregationBuffer,
    workers: BTreeSet<SocketAddr>,
    metrics: RelayMetrics,
}

impl Relay {
    pub fn new(cfg: RelayConfig) -> Self {
        let buffer = AggregationBuffer::new(cfg.max_parts(), cfg.buffer_capacity());

        Self {
            cfg,
            buffer,
            workers: BTreeSet::new(),
            metrics: RelayMetrics::default(),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.cfg
    }

    pub fn buffer(&self) -> &AggregationBuffer {
        &self.buffer
    }

    pub fn metrics(&self) -> &RelayMetrics {
        &self.metrics
    }

    /// Every address a contribution was received from so far.
    pub fn workers(&self) -> &BTreeSet<SocketAddr> {
        &self.workers
    }

    /// Handles one inbound datagram.
    ///
    /// # Args
    /// * `payload` - The raw datagram.
    /// * `from` - Its sender.
    /// * `out` - Where the messages to send are pushed, in order.
    ///
    /// # Returns
    /// `Flow::Halt` if the rest of the batch must be left for the next receive.
    pub fn on_message(
        &mut self,
        payload: &[u8],
        from: SocketAddr,
        out: &mut Vec<Outgoing>,
    ) -> Flow {
        self.metrics.bump_received();

        let msg = match Msg::deserialize(payload) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("relay dropping message from {from}: {e}");
                self.metrics.bump_malformed();
                return Flow::Continue;
            }
        };

        debug!("relay received {msg} from {from}");

        match msg {
            Msg::Contribution { job, part, round } => self.aggregate(job, part, round, from, out),
            Msg::CompletionAck { .. } => self.forward(msg, out),
            other => {
                warn!("relay unexpected message from {from}: got={}", other.kind());
                self.metrics.bump_unexpected();
                Flow::Continue
            }
        }
    }

    fn aggregate(
        &mut self,
        job: JobId,
        part: PartId,
        round: RoundId,
        from: SocketAddr,
        out: &mut Vec<Outgoing>,
    ) -> Flow {
        self.workers.insert(from);

        // The round is acked before the buffer gets to say anything about it.
        out.push(Outgoing {
            msg: Msg::RoundAck { round },
            dst: from,
        });
        self.metrics.bump_round_acks();

        let key = AggKey { job, round };
        match self.buffer.insert(key, part) {
            Ok(Progress::Open { received }) => {
                debug!(
                    "round ({key}) has {received}/{} parts",
                    self.buffer.max_parts()
                );
                Flow::Continue
            }
            Ok(Progress::Complete) => {
                let msg = Msg::CombinedResult { job, round };
                info!("round ({key}) complete, sending {msg} to coordinator");

                out.push(Outgoing {
                    msg,
                    dst: self.cfg.coordinator_addr(),
                });
                self.metrics.bump_results();
                Flow::Continue
            }
            Err(e @ AggregationErr::DuplicatePart { .. }) => {
                warn!("{e}");
                self.metrics.bump_duplicates();
                Flow::Continue
            }
            Err(e @ AggregationErr::Overflow { .. }) => {
                warn!("{e}");
                self.metrics.bump_overflows();
                self.batch_flow()
            }
        }
    }

    fn forward(&mut self, msg: Msg, out: &mut Vec<Outgoing>) -> Flow {
        match self.cfg.worker_broadcast() {
            Some(dst) => {
                info!("forwarding {msg} to {dst}");
                out.push(Outgoing { msg, dst });
            }
            None => {
                info!("forwarding {msg} to {} workers", self.workers.len());
                out.extend(self.workers.iter().map(|&dst| Outgoing { msg, dst }));
            }
        }

        self.metrics.bump_forwarded();
        self.batch_flow()
    }

    fn batch_flow(&mut self) -> Flow {
        match self.cfg.batch_policy() {
            BatchPolicy::AbortBatch => {
                self.metrics.bump_halted_batches();
                Flow::Halt
            }
            BatchPolicy::DropOne => Flow::Continue,
        }
    }
}
