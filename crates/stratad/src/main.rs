//! stratad — strata cluster node daemon.

use anyhow::Result;

use strata_core::config::StrataConfig;
use stratad::node::Node;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = StrataConfig::load()?;
    tracing::info!(?config.node.bind_addr, config.node.bind_port, "stratad starting");

    let node = Node::bootstrap(&config).await?;
    tracing::info!(node_id = node.node_id, addr = %node.local_addr, "joined cluster");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    node.shutdown();
    node.join().await;

    Ok(())
}
