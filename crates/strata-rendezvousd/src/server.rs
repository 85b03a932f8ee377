//! The rendezvous server: the single point every node first connects to.
//! Assigns node ids in join order, keeps the full `(ip, port)` directory,
//! and broadcasts it to every connected node on each new join: handshake,
//! assign the next id, append to the roster, then notify everyone —
//! including the node that just joined.

use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, Mutex};

use strata_core::wire::{ClientInfo, ClusterMember, Handshake, HandshakeResponse, MessageType};
use strata_net::error::NetError;
use strata_net::framing::{read_frame, write_frame};

struct Client {
    member: ClusterMember,
    writer: OwnedWriteHalf,
}

#[derive(Default)]
struct Roster {
    clients: Vec<Client>,
}

/// Shared server state: every node that has joined so far, in arrival
/// order (arrival order is node id).
#[derive(Default)]
pub struct RendezvousServer {
    roster: Mutex<Roster>,
}

impl RendezvousServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts connections on `listener`, handshaking each one in turn and
    /// broadcasting the updated directory, until `shutdown` fires. On
    /// shutdown, every connected client is sent `Teardown` before this
    /// function returns.
    pub async fn run(
        self: Arc<Self>,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), NetError> {
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("rendezvous server tearing down");
                    self.send_teardown_to_all().await;
                    return Ok(());
                }
                accepted = listener.accept() => {
                    let (stream, peer_addr) = accepted?;
                    tracing::debug!(%peer_addr, "accepted rendezvous connection");
                    if let Err(e) = self.handshake_and_notify(stream).await {
                        tracing::warn!(error = %e, %peer_addr, "handshake failed");
                    }
                }
            }
        }
    }

    async fn handshake_and_notify(&self, mut stream: TcpStream) -> Result<(), NetError> {
        let frame = read_frame(&mut stream).await?.ok_or(NetError::PeerGone)?;
        if frame.message_type != MessageType::Handshake {
            return Err(NetError::PeerGone);
        }
        let handshake = Handshake::decode(frame.payload)?;

        // The rendezvous protocol never reads from a joined node again; the
        // read half is dropped immediately, the write half is kept to push
        // future directory broadcasts and the final teardown.
        let (_read_half, mut write_half) = stream.into_split();

        let node_id = {
            let roster = self.roster.lock().await;
            roster.clients.len() as u32
        };

        let response = HandshakeResponse { node_id };
        write_frame(&mut write_half, MessageType::Data, &response.encode()).await?;

        let member = ClusterMember { port: handshake.port, ip: handshake.ip };
        {
            let mut roster = self.roster.lock().await;
            roster.clients.push(Client { member, writer: write_half });
        }

        tracing::info!(node_id, ip = handshake.ip, port = handshake.port, "node joined cluster");
        self.notify_all().await;
        Ok(())
    }

    /// Broadcasts the full member list to every connected client, including
    /// the one that just joined.
    async fn notify_all(&self) {
        let mut roster = self.roster.lock().await;
        let members: Vec<ClusterMember> = roster.clients.iter().map(|c| c.member).collect();
        let info = ClientInfo { members };
        let payload = info.encode();

        for client in roster.clients.iter_mut() {
            if let Err(e) = write_frame(&mut client.writer, MessageType::Data, &payload).await {
                tracing::warn!(error = %e, "failed to notify a client of directory update");
            }
        }
    }

    async fn send_teardown_to_all(&self) {
        let mut roster = self.roster.lock().await;
        for client in roster.clients.iter_mut() {
            let _ = write_frame(&mut client.writer, MessageType::Teardown, b"").await;
            let _ = client.writer.shutdown().await;
        }
    }
}
