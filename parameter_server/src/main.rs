use std::io;

use comms::{
    UdpTransport,
    specs::{self, CoordinatorSpec},
};
use log::info;
use parameter_server::ParameterServer;
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let addr = specs::bind_addr_from_env()?;
    let spec: CoordinatorSpec = specs::from_env()?;

    let transport = UdpTransport::bind(addr).await?;
    info!(
        "parameter server listening at {addr}, acking to {}",
        spec.broadcast_addr
    );

    let server = ParameterServer::new(transport, spec.broadcast_addr);
    let token = CancellationToken::new();
    let handle = tokio::spawn(server.run(token.clone()));

    signal::ctrl_c().await?;
    info!("received SIGINT, shutting down");
    token.cancel();

    let metrics = handle.await.map_err(io::Error::other)??;
    info!("completed={}", metrics.completed);
    Ok(())
}
