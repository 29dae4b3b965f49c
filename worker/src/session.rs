use std::time::Duration;

use comms::{Msg, PartId, RoundId, specs::CompletionPolicy};
use log::{debug, info};

use crate::config::WorkerConfig;

/// The lifecycle of a worker session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing is scheduled, waiting for an ack to widen the window.
    Idle,
    /// The contribution for `round` is scheduled to be sent.
    Sending { round: RoundId },
    /// The contribution for `round` went out, waiting for its round ack.
    AwaitingAck { round: RoundId },
    Stopped,
}

/// What the driver must do with its send timer after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// (Re)arm the timer to send after the given delay.
    After(Duration),
    /// Drop any pending send.
    Cancel,
    /// Leave the timer as it is.
    Keep,
}

/// The pacing state machine of a single `(job, part)` worker.
///
/// Contributions are paced by two windows: the relay window bounds how far ahead of the
/// last round ack the worker may go, the ack window bounds how far ahead of the last
/// completion ack it may go. There's no local retransmission, a lost round ack stalls
/// the session until another ack reopens the window.
#[derive(Debug)]
pub struct WorkerSession {
    cfg: WorkerConfig,
    state: SessionState,
    sent: RoundId,
    last_ack: RoundId,
    last_completion: RoundId,
}

impl WorkerSession {
    /// Creates a new idle `WorkerSession`.
    ///
    /// # Arguments
    /// * `cfg` - The session's configuration.
    pub fn new(cfg: WorkerConfig) -> Self {
        Self {
            cfg,
            state: SessionState::Idle,
            sent: 0,
            last_ack: 0,
            last_completion: 0,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.cfg
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the next round to be produced.
    pub fn sent(&self) -> RoundId {
        self.sent
    }

    /// Returns the round most recently acknowledged by the relay.
    pub fn last_ack(&self) -> RoundId {
        self.last_ack
    }

    /// Returns the round most recently confirmed complete by the coordinator.
    pub fn last_completion(&self) -> RoundId {
        self.last_completion
    }

    /// The highest round the windows currently allow to be sent.
    pub fn boundary(&self) -> RoundId {
        let relay_bound = self.last_ack.saturating_add(self.cfg.relay_window());
        let ack_bound = self.last_completion.saturating_add(self.cfg.ack_window());
        relay_bound.min(ack_bound)
    }

    pub fn is_stopped(&self) -> bool {
        self.state == SessionState::Stopped
    }

    /// Whether every configured round was sent and acknowledged.
    ///
    /// Never true for unlimited sessions.
    pub fn is_exhausted(&self) -> bool {
        self.state == SessionState::Idle && !self.cfg.has_round(self.sent)
    }

    /// Schedules the first contribution, if there's any to send.
    pub fn start(&mut self) -> Schedule {
        if self.is_stopped() || !self.cfg.has_round(self.sent) {
            return Schedule::Keep;
        }

        info!(
            job = self.cfg.job_id(),
            part = self.cfg.part_id(),
            max_rounds = self.cfg.max_rounds();
            "worker session started"
        );

        self.state = SessionState::Sending { round: self.sent };
        Schedule::After(Duration::ZERO)
    }

    /// Produces the scheduled contribution and advances the send counter.
    ///
    /// # Returns
    /// The contribution to send, or `None` if no send was scheduled.
    pub fn send(&mut self) -> Option<Msg> {
        let SessionState::Sending { .. } = self.state else {
            return None;
        };

        let round = self.sent;
        let msg = Msg::Contribution {
            job: self.cfg.job_id(),
            part: self.cfg.part_id(),
            round,
        };

        self.sent = self.sent.saturating_add(1);
        self.state = SessionState::AwaitingAck { round };

        info!(
            "worker ({},{}) sent round {round}",
            self.cfg.job_id(),
            self.cfg.part_id()
        );

        Some(msg)
    }

    /// Handles a round ack from the relay.
    ///
    /// The ack is authoritative: the send counter restarts right after `round`, whatever
    /// was sent before.
    ///
    /// # Arguments
    /// * `round` - The acknowledged round.
    pub fn on_round_ack(&mut self, round: RoundId) -> Schedule {
        if self.is_stopped() {
            return Schedule::Keep;
        }

        self.last_ack = round;
        self.sent = round.saturating_add(1);
        self.reschedule(Schedule::Cancel)
    }

    /// Handles a completion ack broadcast by the coordinator.
    ///
    /// Under `CompletionPolicy::Frozen` the completion watermark never moves. Under
    /// `CompletionPolicy::Advance` it moves forward to `round` and an idle session resumes
    /// sending if the wider window allows it.
    ///
    /// # Arguments
    /// * `part` - The second field of the ack, as echoed by the coordinator.
    /// * `round` - The completed round.
    pub fn on_completion_ack(&mut self, part: PartId, round: RoundId) -> Schedule {
        if self.is_stopped() {
            return Schedule::Keep;
        }

        match self.cfg.completion_policy() {
            CompletionPolicy::Frozen => {
                debug!(part = part, round = round; "completion ack ignored by frozen policy");
                Schedule::Keep
            }
            CompletionPolicy::Advance => {
                self.last_completion = self.last_completion.max(round);

                match self.state {
                    SessionState::Idle => self.reschedule(Schedule::Keep),
                    _ => Schedule::Keep,
                }
            }
        }
    }

    /// Stops the session, any further event is a no-op.
    ///
    /// # Returns
    /// Always `Schedule::Cancel`, the pending send must not fire.
    pub fn stop(&mut self) -> Schedule {
        if !self.is_stopped() {
            info!(
                "worker ({},{}) stopped at round {}",
                self.cfg.job_id(),
                self.cfg.part_id(),
                self.sent
            );
        }

        self.state = SessionState::Stopped;
        Schedule::Cancel
    }

    /// Schedules the next send if the windows allow it, otherwise goes idle.
    fn reschedule(&mut self, otherwise: Schedule) -> Schedule {
        let boundary = self.boundary();

        if self.cfg.has_round(self.sent) && self.sent <= boundary {
            debug!(round = self.sent, boundary = boundary; "scheduling next contribution");
            self.state = SessionState::Sending { round: self.sent };
            return Schedule::After(self.cfg.interval());
        }

        debug!(round = self.sent, boundary = boundary; "window closed, going idle");
        self.state = SessionState::Idle;
        otherwise
    }
}

#[cfg(test)]
mod tests {
    use std::{net::SocketAddr, num::NonZeroU32};

    use comms::specs::WorkerSpec;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    const INTERVAL: Duration = Duration::from_millis(100);

    fn config(max_rounds: u32, policy: CompletionPolicy) -> WorkerConfig {
        WorkerConfig::from(WorkerSpec {
            job_id: 1,
            part_id: 0,
            relay_addr: SocketAddr::from(([10, 1, 1, 2], 9)),
            max_rounds,
            interval_ms: INTERVAL.as_millis() as u64,
            ack_window: NonZeroU32::new(15).unwrap(),
            relay_window: NonZeroU32::new(5).unwrap(),
            completion_policy: policy,
        })
    }

    fn session(max_rounds: u32) -> WorkerSession {
        WorkerSession::new(config(max_rounds, CompletionPolicy::Frozen))
    }

    /// Sends and acks every allowed round until the session goes idle.
    fn run_until_idle(session: &mut WorkerSession) -> Vec<RoundId> {
        let mut rounds = Vec::new();

        while let Some(Msg::Contribution { round, .. }) = session.send() {
            rounds.push(round);
            session.on_round_ack(round);
        }

        rounds
    }

    #[test]
    fn start_schedules_first_round_immediately() {
        let mut session = session(10);
        assert_eq!(session.sent(), 0);
        assert_eq!(session.start(), Schedule::After(Duration::ZERO));
        assert_eq!(session.state(), SessionState::Sending { round: 0 });

        let msg = session.send().unwrap();
        assert_eq!(
            msg,
            Msg::Contribution {
                job: 1,
                part: 0,
                round: 0
            }
        );
        assert_eq!(session.sent(), 1);
        assert_eq!(session.state(), SessionState::AwaitingAck { round: 0 });
    }

    #[test]
    fn start_respects_round_limit() {
        let mut unlimited = WorkerSession::new(config(0, CompletionPolicy::Frozen));
        assert_eq!(unlimited.start(), Schedule::After(Duration::ZERO));

        let mut done = session(3);
        done.on_round_ack(2);
        assert_eq!(done.start(), Schedule::Keep);
        assert_eq!(done.state(), SessionState::Idle);
    }

    #[test]
    fn send_requires_a_scheduled_round() {
        let mut session = session(10);
        assert_eq!(session.send(), None);

        session.start();
        assert!(session.send().is_some());
        assert_eq!(session.send(), None);
        assert_eq!(session.sent(), 1);
    }

    #[test]
    fn first_ack_opens_relay_window() {
        let mut session = session(10);
        session.start();
        session.send();

        assert_eq!(session.on_round_ack(0), Schedule::After(INTERVAL));
        assert_eq!(session.sent(), 1);
        assert_eq!(session.last_ack(), 0);
        assert_eq!(session.boundary(), 5);
        assert_eq!(session.state(), SessionState::Sending { round: 1 });
    }

    #[test]
    fn ack_collapses_gaps() {
        let mut session = session(100);
        session.start();
        session.send();

        session.on_round_ack(4);
        assert_eq!(session.sent(), 5);

        // A stale ack rewinds the counter as well.
        session.on_round_ack(2);
        assert_eq!(session.sent(), 3);
        assert_eq!(session.last_ack(), 2);
    }

    #[test]
    fn frozen_completion_stalls_at_ack_window() {
        let mut session = session(100);
        session.start();

        let rounds = run_until_idle(&mut session);

        // lastCompletion stays at 0, so round 16 is past 0 + 15.
        assert_eq!(rounds, (0..=15).collect::<Vec<_>>());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.sent(), 16);
        assert_eq!(session.boundary(), 15);

        assert_eq!(session.on_completion_ack(0, 15), Schedule::Keep);
        assert_eq!(session.last_completion(), 0);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn advancing_completion_resumes_idle_session() {
        let mut session = WorkerSession::new(config(100, CompletionPolicy::Advance));
        session.start();
        run_until_idle(&mut session);
        assert_eq!(session.sent(), 16);

        assert_eq!(session.on_completion_ack(1, 10), Schedule::After(INTERVAL));
        assert_eq!(session.last_completion(), 10);
        assert_eq!(session.boundary(), 20);
        assert_eq!(session.state(), SessionState::Sending { round: 16 });

        // The watermark never moves backwards.
        session.on_completion_ack(1, 3);
        assert_eq!(session.last_completion(), 10);
    }

    #[test]
    fn advancing_completion_keeps_busy_session_untouched() {
        let mut session = WorkerSession::new(config(100, CompletionPolicy::Advance));
        session.start();
        session.send();

        assert_eq!(session.on_completion_ack(1, 0), Schedule::Keep);
        assert_eq!(session.state(), SessionState::AwaitingAck { round: 0 });
    }

    #[test]
    fn exhausts_after_last_ack() {
        let mut session = session(3);
        session.start();

        let rounds = run_until_idle(&mut session);
        assert_eq!(rounds, vec![0, 1, 2]);
        assert!(session.is_exhausted());
    }

    #[test]
    fn unlimited_session_never_exhausts() {
        let mut session = WorkerSession::new(config(0, CompletionPolicy::Advance));
        session.start();

        for round in 0..1000 {
            let msg = session.send().unwrap();
            assert_eq!(
                msg,
                Msg::Contribution {
                    job: 1,
                    part: 0,
                    round
                }
            );
            session.on_round_ack(round);
            session.on_completion_ack(1, round);
        }

        assert!(!session.is_exhausted());
    }

    #[test]
    fn stop_cancels_and_silences() {
        let mut session = session(10);
        session.start();

        assert_eq!(session.stop(), Schedule::Cancel);
        assert!(session.is_stopped());
        assert_eq!(session.send(), None);
        assert_eq!(session.on_round_ack(0), Schedule::Keep);
        assert_eq!(session.on_completion_ack(0, 0), Schedule::Keep);
        assert_eq!(session.start(), Schedule::Keep);
        assert_eq!(session.sent(), 0);
    }

    #[test]
    fn window_closed_ack_cancels_pending_send() {
        let mut session = session(100);
        session.start();
        run_until_idle(&mut session);

        // A duplicate ack for the last round doesn't reopen the window.
        assert_eq!(session.on_round_ack(15), Schedule::Cancel);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn ack_sequences_respect_both_windows() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let policy = if rng.random_bool(0.5) {
                CompletionPolicy::Advance
            } else {
                CompletionPolicy::Frozen
            };

            let mut session = WorkerSession::new(config(rng.random_range(1..60), policy));
            let mut in_flight: Vec<RoundId> = Vec::new();
            session.start();

            for _ in 0..200 {
                if let Some(Msg::Contribution { round, .. }) = session.send() {
                    in_flight.push(round);
                }

                if in_flight.is_empty() {
                    break;
                }

                // Ack any round that was actually sent, duplicates included.
                let round = in_flight[rng.random_range(0..in_flight.len())];
                session.on_round_ack(round);

                assert_eq!(session.sent(), session.last_ack() + 1);
                assert!(session.sent() <= session.boundary() + 1);

                if rng.random_bool(0.3) {
                    session.on_completion_ack(1, round);
                }

                if rng.random_bool(0.5) {
                    in_flight.retain(|r| *r != round);
                }
            }
        }
    }
}
