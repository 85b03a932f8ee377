//! strata-rendezvousd — the cluster bootstrap server.

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use strata_core::config::StrataConfig;
use strata_rendezvousd::RendezvousServer;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = StrataConfig::load()?;
    let bind_addr = format!("{}:{}", config.rendezvous.addr, config.rendezvous.port);
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "rendezvous server listening");

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let server = Arc::new(RendezvousServer::new());
    let server_task = tokio::spawn(server.run(listener, shutdown_rx));

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    let _ = shutdown_tx.send(());
    server_task.await??;

    Ok(())
}
