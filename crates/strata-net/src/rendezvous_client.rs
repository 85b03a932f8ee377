//! Rendezvous client — connects to the bootstrap server once at startup,
//! performs the handshake to learn this node's id, then keeps draining
//! `ClientInfo` directory updates and the `Teardown` shutdown signal for the
//! lifetime of the process.

use std::net::{Ipv4Addr, SocketAddr};

use strata_core::wire::{ClientInfo, Handshake, HandshakeResponse, MessageType};
use tokio::net::TcpStream;
use tokio::sync::broadcast;

use crate::directory::ClusterDirectory;
use crate::error::NetError;
use crate::framing::{read_frame, write_frame};

/// Outcome of a successful handshake: this node's assigned id plus the
/// still-open connection to keep draining for directory updates.
pub struct Joined {
    pub node_id: u32,
    stream: TcpStream,
}

/// Connects to the rendezvous server at `rendezvous_addr` and hands back
/// this node's assigned id plus a `Joined` handle to drive the background
/// update loop with.
pub async fn join(
    rendezvous_addr: SocketAddr,
    self_ip: Ipv4Addr,
    self_port: u16,
) -> Result<Joined, NetError> {
    let mut stream = TcpStream::connect(rendezvous_addr).await?;

    let handshake = Handshake { ip: u32::from(self_ip), port: self_port };
    write_frame(&mut stream, MessageType::Handshake, &handshake.encode()).await?;

    let frame = read_frame(&mut stream).await?.ok_or(NetError::PeerGone)?;
    if frame.message_type != MessageType::Data {
        return Err(NetError::PeerGone);
    }
    let response = HandshakeResponse::decode(frame.payload)?;

    tracing::info!(node_id = response.node_id, %rendezvous_addr, "joined cluster");
    Ok(Joined { node_id: response.node_id, stream })
}

impl Joined {
    /// Drains `ClientInfo` broadcasts into `directory` until the server
    /// sends `Teardown` or closes the connection, or `shutdown` fires.
    pub async fn run(mut self, directory: ClusterDirectory, mut shutdown: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("rendezvous client shutting down");
                    return;
                }
                frame = read_frame(&mut self.stream) => {
                    let frame = match frame {
                        Ok(Some(f)) => f,
                        Ok(None) => { tracing::warn!("rendezvous connection closed"); return; }
                        Err(e) => { tracing::warn!(error = %e, "rendezvous read failed"); return; }
                    };

                    match frame.message_type {
                        MessageType::ClientInfo => {
                            match ClientInfo::decode(frame.payload) {
                                Ok(info) => {
                                    tracing::debug!(n = info.members.len(), "cluster directory updated");
                                    directory.replace(info.members).await;
                                }
                                Err(e) => tracing::warn!(error = %e, "malformed ClientInfo"),
                            }
                        }
                        MessageType::Teardown => {
                            tracing::info!("received teardown from rendezvous server");
                            return;
                        }
                        other => {
                            tracing::warn!(?other, "unexpected message from rendezvous server");
                        }
                    }
                }
            }
        }
    }
}
