use std::io;

use comms::{
    UdpTransport,
    specs::{self, RelaySpec},
};
use log::info;
use relay::{Relay, RelayConfig, RelayService};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let addr = specs::bind_addr_from_env()?;
    let spec: RelaySpec = specs::from_env()?;

    let transport = UdpTransport::bind(addr).await?;
    info!(
        "relaying at {addr}: max_parts={} coordinator={}",
        spec.max_parts, spec.coordinator_addr
    );

    let service = RelayService::new(Relay::new(RelayConfig::from(spec)), transport);
    let token = CancellationToken::new();
    let handle = tokio::spawn(service.run(token.clone()));

    signal::ctrl_c().await?;
    info!("received SIGINT, shutting down");
    token.cancel();

    handle.await.map_err(io::Error::other)??;
    Ok(())
}
