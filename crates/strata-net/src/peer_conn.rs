//! Peer-to-peer remote byte-store calls.
//!
//! A remote `put`/`get`/`wait_and_get` opens a fresh short-lived connection
//! to the owning peer, sends one `KBMessage`, and reads the reply
//! synchronously on that same connection. No connection pooling.

use std::net::SocketAddr;

use strata_core::wire::{KbMessage, MessageType};
use tokio::net::TcpStream;

use crate::error::NetError;
use crate::framing::{read_frame, write_frame};

/// Sends `request` to `addr` over a new connection and returns the peer's
/// `KBMessage` reply. The connection is closed when this call returns.
pub async fn call(addr: SocketAddr, request: KbMessage) -> Result<KbMessage, NetError> {
    let mut stream = TcpStream::connect(addr).await?;
    write_frame(&mut stream, MessageType::Data, &request.encode()).await?;

    let frame = read_frame(&mut stream).await?.ok_or(NetError::PeerGone)?;
    if frame.message_type != MessageType::Data {
        return Err(NetError::PeerGone);
    }
    Ok(KbMessage::decode(frame.payload)?)
}
