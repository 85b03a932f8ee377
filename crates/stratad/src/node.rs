//! Embeddable node handle: joins the rendezvous server, starts the peer
//! listener, and wires both into a `ByteStore`. Used by `main` and by the
//! integration tests, which build a small in-process cluster of these.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use strata_core::config::StrataConfig;
use strata_core::key::NodeId;
use strata_net::{listener, rendezvous_client, ClusterDirectory};
use strata_store::ByteStore;

/// A running node: its byte-store, its view of the cluster, and the
/// background tasks keeping both alive.
pub struct Node {
    pub store: Arc<ByteStore>,
    pub directory: ClusterDirectory,
    pub node_id: NodeId,
    pub local_addr: SocketAddr,
    shutdown_tx: broadcast::Sender<()>,
    tasks: Vec<JoinHandle<()>>,
}

impl Node {
    /// Binds the peer listener, joins the rendezvous server at
    /// `config.rendezvous`, and spawns the background tasks that keep the
    /// directory updated and serve inbound byte-store RPCs.
    pub async fn bootstrap(config: &StrataConfig) -> anyhow::Result<Self> {
        let bind_addr = format!("{}:{}", config.node.bind_addr, config.node.bind_port);
        let listener_socket = TcpListener::bind(&bind_addr).await?;
        let local_addr = listener_socket.local_addr()?;

        let advertise_ip = match config.node.bind_addr.parse::<Ipv4Addr>() {
            Ok(ip) if ip != Ipv4Addr::UNSPECIFIED => ip,
            _ => Ipv4Addr::LOCALHOST,
        };

        let rendezvous_addr: SocketAddr =
            format!("{}:{}", config.rendezvous.addr, config.rendezvous.port).parse()?;
        let joined = rendezvous_client::join(rendezvous_addr, advertise_ip, local_addr.port()).await?;
        let node_id = joined.node_id;

        let directory = ClusterDirectory::new();
        let (shutdown_tx, _) = broadcast::channel(1);

        let rendezvous_task = tokio::spawn(joined.run(directory.clone(), shutdown_tx.subscribe()));

        let store = Arc::new(ByteStore::new(node_id, directory.clone()));
        let store_for_handler = store.clone();
        let handler = Arc::new(move |stream: TcpStream| {
            let store = store_for_handler.clone();
            async move { strata_store::handler::handle_connection(store, stream).await }
        });
        let listener_shutdown_rx = shutdown_tx.subscribe();
        let listener_task = tokio::spawn(async move {
            if let Err(e) = listener::serve(listener_socket, listener_shutdown_rx, handler).await {
                tracing::warn!(error = %e, "peer listener exited with an error");
            }
        });

        Ok(Self {
            store,
            directory,
            node_id,
            local_addr,
            shutdown_tx,
            tasks: vec![rendezvous_task, listener_task],
        })
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Waits for every background task to finish (normally only after
    /// `shutdown`).
    pub async fn join(self) {
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "node background task panicked");
            }
        }
    }
}
