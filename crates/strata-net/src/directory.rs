//! Cluster directory — a node's view of `(num_nodes, per_node(ip, port))`,
//! pushed by the rendezvous server whenever membership changes. Node
//! ordering in the directory defines node ids.
//!
//! Written only by the task draining the rendezvous connection, read by any
//! task that needs to address a peer; a single-writer/many-reader lock
//! suffices.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;

use strata_core::wire::ClusterMember;

#[derive(Debug, Default)]
struct Inner {
    members: Vec<ClusterMember>,
}

/// Shared, clonable handle to a node's view of the cluster.
#[derive(Clone, Debug, Default)]
pub struct ClusterDirectory {
    inner: Arc<tokio::sync::RwLock<Inner>>,
}

impl ClusterDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole directory. Called when a new `ClientInfo`
    /// broadcast arrives.
    pub async fn replace(&self, members: Vec<ClusterMember>) {
        let mut inner = self.inner.write().await;
        inner.members = members;
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.members.len()
    }

    /// Resolve a node id to its reachable socket address.
    pub async fn addr_of(&self, node: u32) -> Option<SocketAddr> {
        let inner = self.inner.read().await;
        inner.members.get(node as usize).map(|m| {
            SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::from(m.ip), m.port))
        })
    }

    pub async fn snapshot(&self) -> Vec<ClusterMember> {
        self.inner.read().await.members.clone()
    }
}
