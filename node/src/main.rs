use std::{env, io, pin::pin};

use comms::specs;
use log::info;
use node::{TopologyReport, TopologySpec};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let spec = match env::var_os("SPEC") {
        Some(_) => specs::from_env()?,
        None => TopologySpec::default(),
    };

    info!(
        "launching {} workers of job {} for {} rounds",
        spec.workers, spec.job_id, spec.max_rounds
    );

    let token = CancellationToken::new();
    let mut run = pin!(node::launch(&spec, token.clone()));

    let report = tokio::select! {
        ret = &mut run => ret?,
        _ = signal::ctrl_c() => {
            info!("received SIGINT, stopping topology");
            token.cancel();
            run.await?
        }
    };

    log_report(&report);
    Ok(())
}

fn log_report(report: &TopologyReport) {
    for (part, worker) in report.workers.iter().enumerate() {
        info!(
            "worker {part}: sent={} last_ack={} exhausted={}",
            worker.sent, worker.last_ack, worker.exhausted
        );
    }

    info!(
        "relay: received={} results={} forwarded={}",
        report.relay.received, report.relay.results, report.relay.forwarded
    );
    info!("coordinator: completed={}", report.coordinator.completed);
}
