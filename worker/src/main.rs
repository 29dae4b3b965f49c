use std::{io, pin::pin};

use comms::{
    UdpTransport,
    specs::{self, WorkerSpec},
};
use log::info;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use worker::{Worker, WorkerConfig, WorkerReport};

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let addr = specs::bind_addr_from_env()?;
    let spec: WorkerSpec = specs::from_env()?;

    let transport = UdpTransport::bind(addr).await?;
    info!("listening at {addr}, contributing to relay at {}", spec.relay_addr);

    let worker = Worker::new(WorkerConfig::from(spec), transport);
    let token = CancellationToken::new();
    let mut run = pin!(worker.run(token.clone()));

    let report = tokio::select! {
        ret = &mut run => ret?,
        _ = signal::ctrl_c() => {
            info!("received SIGINT, stopping session");
            token.cancel();
            run.await?
        }
    };

    log_report(&report);
    Ok(())
}

fn log_report(report: &WorkerReport) {
    let WorkerReport {
        sent,
        last_ack,
        last_completion,
        exhausted,
        metrics,
    } = report;

    info!(
        "sent={sent} last_ack={last_ack} last_completion={last_completion} exhausted={exhausted} \
         contributions={} round_acks={} completion_acks={} malformed={}",
        metrics.contributions, metrics.round_acks, metrics.completion_acks, metrics.malformed
    );
}
