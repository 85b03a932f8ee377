//! Per-connection inbound handler: reads one `KBMessage` request per
//! connection (peer connections are short-lived and carry exactly one
//! request/response pair), dispatches it against the local byte-store, and
//! writes back the reply before the connection closes.

use std::sync::Arc;

use strata_core::wire::{KbMessage, MessageType};
use strata_net::framing::{read_frame, write_frame};
use tokio::net::TcpStream;

use crate::byte_store::ByteStore;

/// Handles a single accepted peer connection end to end.
pub async fn handle_connection(store: Arc<ByteStore>, mut stream: TcpStream) {
    let frame = match read_frame(&mut stream).await {
        Ok(Some(f)) => f,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read inbound frame");
            return;
        }
    };

    if frame.message_type != MessageType::Data {
        tracing::warn!(?frame.message_type, "expected Data frame on peer connection");
        return;
    }

    let request = match KbMessage::decode(frame.payload) {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(error = %e, "malformed KBMessage");
            return;
        }
    };

    let reply = store.dispatch_inbound(request).await;

    if let Err(e) = write_frame(&mut stream, MessageType::Data, &reply.encode()).await {
        tracing::warn!(error = %e, "failed to write reply frame");
    }
}
