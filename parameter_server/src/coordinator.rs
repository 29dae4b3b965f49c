use std::net::SocketAddr;

use comms::{Deserialize, Msg};
use log::{debug, info, warn};

/// Counters collected by the coordinator while it runs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoordinatorMetrics {
    pub received: u64,
    /// Records that were accepted and acknowledged.
    pub completed: u64,
    /// Completion acks that came back to the coordinator.
    pub echoes: u64,
    pub malformed: u64,
    pub unexpected: u64,
}

/// The terminal sink of the aggregation protocol.
///
/// Every accepted record is acknowledged with a completion ack made out of its second
/// and third fields, whether it is a combined result or a raw contribution.
#[derive(Debug, Default)]
pub struct Coordinator {
    metrics: CoordinatorMetrics,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &CoordinatorMetrics {
        &self.metrics
    }

    /// Returns the amount of accepted records.
    pub fn completed(&self) -> u64 {
        self.metrics.completed
    }

    /// Handles one inbound datagram.
    ///
    /// # Returns
    /// The completion ack to broadcast, if the datagram was an acceptable record.
    pub fn on_message(&mut self, payload: &[u8], from: SocketAddr) -> Option<Msg> {
        self.metrics.received += 1;

        let msg = match Msg::deserialize(payload) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("coordinator dropping message from {from}: {e}");
                self.metrics.malformed += 1;
                return None;
            }
        };

        let ack = match msg {
            Msg::CombinedResult { job, round } => Msg::CompletionAck { part: job, round },
            Msg::Contribution { part, round, .. } => Msg::CompletionAck { part, round },
            Msg::CompletionAck { .. } => {
                debug!("ignoring echoed {msg} from {from}");
                self.metrics.echoes += 1;
                return None;
            }
            Msg::RoundAck { .. } => {
                warn!("coordinator unexpected message from {from}: got={}", msg.kind());
                self.metrics.unexpected += 1;
                return None;
            }
        };

        self.metrics.completed += 1;
        info!("completed={} accepted {msg}, replying {ack}", self.metrics.completed);

        Some(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from() -> SocketAddr {
        SocketAddr::from(([10, 1, 1, 2], 9))
    }

    #[test]
    fn acknowledges_raw_contributions() {
        let mut coordinator = Coordinator::new();

        let ack = coordinator.on_message(b"1,0,9", from());

        assert_eq!(ack, Some(Msg::CompletionAck { part: 0, round: 9 }));
        assert_eq!(ack.unwrap().to_bytes(), b"AACK,0,9");
        assert_eq!(coordinator.completed(), 1);
    }

    #[test]
    fn acknowledges_combined_results_with_the_job_id() {
        let mut coordinator = Coordinator::new();

        let ack = coordinator.on_message(b"RESULT,1,7\0", from());

        assert_eq!(ack, Some(Msg::CompletionAck { part: 1, round: 7 }));
        assert_eq!(coordinator.completed(), 1);
    }

    #[test]
    fn repeated_records_are_counted_each_time() {
        let mut coordinator = Coordinator::new();

        for _ in 0..3 {
            assert!(coordinator.on_message(b"RESULT,1,7", from()).is_some());
        }

        assert_eq!(coordinator.completed(), 3);
    }

    #[test]
    fn ignores_echoes_acks_and_garbage() {
        let mut coordinator = Coordinator::new();

        assert_eq!(coordinator.on_message(b"AACK,0,9", from()), None);
        assert_eq!(coordinator.on_message(b"GACK,9", from()), None);
        assert_eq!(coordinator.on_message(b"RESULT,1", from()), None);
        assert_eq!(coordinator.on_message(b"", from()), None);

        let metrics = coordinator.metrics();
        assert_eq!(metrics.received, 4);
        assert_eq!(metrics.completed, 0);
        assert_eq!(metrics.echoes, 1);
        assert_eq!(metrics.unexpected, 1);
        assert_eq!(metrics.malformed, 2);
    }
}
