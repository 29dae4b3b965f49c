use std::{
    io,
    net::SocketAddr,
    num::NonZeroUsize,
    time::Duration,
};

use comms::{
    Transport, UdpTransport,
    specs::{RelaySpec, WorkerSpec},
};
use futures::future;
use log::info;
use parameter_server::{CoordinatorMetrics, ParameterServer};
use relay::{Relay, RelayConfig, RelayMetrics, RelayService};
use tokio_util::sync::CancellationToken;
use worker::{Worker, WorkerConfig, WorkerReport};

use crate::spec::TopologySpec;

/// What every role of a topology reported once it finished.
#[derive(Debug, Clone)]
pub struct TopologyReport {
    /// One report per worker, indexed by part.
    pub workers: Vec<WorkerReport>,
    pub relay: RelayMetrics,
    pub coordinator: CoordinatorMetrics,
}

/// Runs a whole topology inside the current runtime.
///
/// The coordinator acks back to the relay, which forwards its acks to every worker that
/// contributed. Returns once every worker finished, or once `token` is cancelled.
///
/// # Errors
/// Returns an `io::Error` if a role fails to bind or dies on an I/O failure.
pub async fn launch(spec: &TopologySpec, token: CancellationToken) -> io::Result<TopologyReport> {
    let any_port = SocketAddr::new(spec.host, 0);

    let coordinator_transport = UdpTransport::bind(any_port).await?;
    let relay_transport = UdpTransport::bind(any_port).await?;
    let coordinator_addr = coordinator_transport.local_addr()?;
    let relay_addr = relay_transport.local_addr()?;

    let services = token.child_token();
    let services_guard = services.clone().drop_guard();

    let relay_spec = RelaySpec::new(NonZeroUsize::from(spec.workers), coordinator_addr);
    let relay = Relay::new(RelayConfig::from(relay_spec));
    let relay = tokio::spawn(RelayService::new(relay, relay_transport).run(services.clone()));
    info!("relay at {relay_addr}");

    let server = ParameterServer::new(coordinator_transport, relay_addr);
    let coordinator = tokio::spawn(server.run(services.clone()));
    info!("coordinator at {coordinator_addr}");

    let mut workers = Vec::with_capacity(spec.workers.get() as usize);
    for part in 0..spec.workers.get() {
        let transport = UdpTransport::bind(any_port).await?;
        info!("worker ({},{part}) at {}", spec.job_id, transport.local_addr()?);

        let mut worker_spec = WorkerSpec::new(spec.job_id, part, relay_addr);
        worker_spec.max_rounds = spec.max_rounds;
        worker_spec.interval_ms = spec.interval_ms;

        let worker = Worker::new(WorkerConfig::from(worker_spec), transport);
        workers.push(tokio::spawn(worker.run(token.child_token())));
    }

    let workers = future::join_all(workers)
        .await
        .into_iter()
        .map(|res| -> io::Result<WorkerReport> { Ok(res.map_err(io::Error::other)??) })
        .collect::<io::Result<Vec<_>>>()?;

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_millis(spec.linger_ms)) => {}
        _ = token.cancelled() => {}
    }
    drop(services_guard);

    let relay = relay.await.map_err(io::Error::other)??;
    let coordinator = coordinator.await.map_err(io::Error::other)??;

    Ok(TopologyReport {
        workers,
        relay,
        coordinator,
    })
}
