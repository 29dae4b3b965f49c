use std::{
    io,
    net::SocketAddr,
    num::NonZeroU32,
    time::Duration,
};

use comms::{
    Deserialize, MemNetwork, MemTransport, Msg, RoundId, Transport,
    specs::{CompletionPolicy, WorkerSpec},
};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use worker::{Worker, WorkerConfig};

const JOB: u16 = 1;
const PART: u16 = 2;
const INTERVAL: Duration = Duration::from_millis(500);
const QUIET: Duration = Duration::from_secs(30);

fn relay_addr() -> SocketAddr {
    SocketAddr::from(([10, 1, 1, 2], 9))
}

fn worker_addr() -> SocketAddr {
    SocketAddr::from(([10, 2, 1, 1], 9))
}

fn config(max_rounds: u32, completion_policy: CompletionPolicy) -> WorkerConfig {
    WorkerConfig::from(WorkerSpec {
        job_id: JOB,
        part_id: PART,
        relay_addr: relay_addr(),
        max_rounds,
        interval_ms: INTERVAL.as_millis() as u64,
        ack_window: NonZeroU32::new(15).unwrap(),
        relay_window: NonZeroU32::new(5).unwrap(),
        completion_policy,
    })
}

/// Behaves like a relay that acknowledges every contribution, optionally followed by a
/// completion ack. Returns the received rounds with their arrival time once the worker
/// has been quiet for a while.
async fn mock_relay(
    relay: &MemTransport,
    ack: bool,
    complete: bool,
) -> io::Result<Vec<(RoundId, Instant)>> {
    let mut rounds = Vec::new();
    let mut buf = Vec::new();

    loop {
        let from = match time::timeout(QUIET, relay.recv_from(&mut buf)).await {
            Ok(res) => res?,
            Err(_) => break,
        };

        let Msg::Contribution { job, part, round } = Msg::deserialize(&buf)? else {
            panic!("relay expected a contribution");
        };

        assert_eq!((job, part), (JOB, PART));
        rounds.push((round, Instant::now()));

        if ack {
            let msg = Msg::RoundAck { round };
            relay.send_to(&msg.to_bytes(), from).await?;
        }

        if complete {
            let msg = Msg::CompletionAck { part: JOB, round };
            relay.send_to(&msg.to_bytes(), from).await?;
        }
    }

    Ok(rounds)
}

fn round_ids(rounds: &[(RoundId, Instant)]) -> Vec<RoundId> {
    rounds.iter().map(|(round, _)| *round).collect()
}

#[tokio::test(start_paused = true)]
async fn worker_contributes_every_round_once_acked() -> io::Result<()> {
    let net = MemNetwork::new();
    let relay = net.bind(relay_addr())?;
    let wk = net.bind(worker_addr())?;

    let worker = Worker::new(config(4, CompletionPolicy::Frozen), wk);
    let handle = tokio::spawn(worker.run(CancellationToken::new()));

    let rounds = mock_relay(&relay, true, false).await?;
    let report = handle.await.unwrap()?;

    assert_eq!(round_ids(&rounds), vec![0, 1, 2, 3]);
    for pair in rounds.windows(2) {
        assert!(pair[1].1 - pair[0].1 >= INTERVAL);
    }

    assert!(report.exhausted);
    assert_eq!(report.sent, 4);
    assert_eq!(report.last_ack, 3);
    assert_eq!(report.metrics.contributions, 4);
    assert_eq!(report.metrics.round_acks, 4);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn lost_round_ack_stalls_until_stopped() -> io::Result<()> {
    let net = MemNetwork::new();
    let relay = net.bind(relay_addr())?;
    let wk = net.bind(worker_addr())?;

    let token = CancellationToken::new();
    let worker = Worker::new(config(10, CompletionPolicy::Frozen), wk);
    let handle = tokio::spawn(worker.run(token.clone()));

    let rounds = mock_relay(&relay, false, false).await?;
    assert_eq!(round_ids(&rounds), vec![0]);

    token.cancel();
    let report = handle.await.unwrap()?;
    assert!(!report.exhausted);
    assert_eq!(report.sent, 1);
    assert_eq!(report.metrics.round_acks, 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn frozen_completion_stalls_at_ack_window() -> io::Result<()> {
    let net = MemNetwork::new();
    let relay = net.bind(relay_addr())?;
    let wk = net.bind(worker_addr())?;

    let token = CancellationToken::new();
    let worker = Worker::new(config(100, CompletionPolicy::Frozen), wk);
    let handle = tokio::spawn(worker.run(token.clone()));

    let rounds = mock_relay(&relay, true, true).await?;
    assert_eq!(round_ids(&rounds), (0..=15).collect::<Vec<_>>());

    token.cancel();
    let report = handle.await.unwrap()?;
    assert_eq!(report.sent, 16);
    assert_eq!(report.last_completion, 0);
    assert_eq!(report.metrics.completion_acks, 16);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn advancing_completion_runs_past_ack_window() -> io::Result<()> {
    let net = MemNetwork::new();
    let relay = net.bind(relay_addr())?;
    let wk = net.bind(worker_addr())?;

    let worker = Worker::new(config(40, CompletionPolicy::Advance), wk);
    let handle = tokio::spawn(worker.run(CancellationToken::new()));

    let rounds = mock_relay(&relay, true, true).await?;
    let report = handle.await.unwrap()?;

    assert_eq!(round_ids(&rounds), (0..40).collect::<Vec<_>>());
    assert!(report.exhausted);
    assert!(report.last_completion >= 38);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn malformed_and_unexpected_messages_are_dropped() -> io::Result<()> {
    let net = MemNetwork::new();
    let relay = net.bind(relay_addr())?;
    let wk = net.bind(worker_addr())?;

    let token = CancellationToken::new();
    let worker = Worker::new(config(3, CompletionPolicy::Frozen), wk);
    let handle = tokio::spawn(worker.run(token.clone()));

    let mut buf = Vec::new();
    relay.recv_from(&mut buf).await?;
    assert_eq!(buf, b"1,2,0");

    relay.send_to(b"GACK", worker_addr()).await?;
    relay.send_to(b"GACK,zero", worker_addr()).await?;
    relay.send_to(b"RESULT,1,0", worker_addr()).await?;

    // Nothing above may move the session forward.
    let res = time::timeout(QUIET, relay.recv_from(&mut buf)).await;
    assert!(res.is_err());

    relay
        .send_to(&Msg::RoundAck { round: 0 }.to_bytes(), worker_addr())
        .await?;
    relay.recv_from(&mut buf).await?;
    assert_eq!(buf, b"1,2,1");

    token.cancel();
    let report = handle.await.unwrap()?;
    assert_eq!(report.metrics.malformed, 2);
    assert_eq!(report.metrics.unexpected, 1);
    assert_eq!(report.sent, 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_scheduled_send() -> io::Result<()> {
    let net = MemNetwork::new();
    let relay = net.bind(relay_addr())?;
    let wk = net.bind(worker_addr())?;

    let token = CancellationToken::new();
    let worker = Worker::new(config(3, CompletionPolicy::Frozen), wk);
    let handle = tokio::spawn(worker.run(token.clone()));

    let mut buf = Vec::new();
    relay.recv_from(&mut buf).await?;
    relay
        .send_to(&Msg::RoundAck { round: 0 }.to_bytes(), worker_addr())
        .await?;

    // Round 1 is now scheduled `INTERVAL` from the ack, stop before it fires.
    time::sleep(INTERVAL / 2).await;
    token.cancel();

    let report = handle.await.unwrap()?;
    assert_eq!(report.sent, 1);
    assert_eq!(report.metrics.contributions, 1);
    assert_eq!(relay.try_recv_from(&mut buf)?, None);
    Ok(())
}
