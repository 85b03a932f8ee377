//! Message framing over an async byte stream.
//!
//! Every message is `[u8 message_type][u32_le total_length][payload]`, where
//! `total_length` counts the header too. A `MessageReader` never blocks
//! inside the header read; once it has the header it knows exactly how many
//! more bytes to pull for the payload.

use bytes::Bytes;
use strata_core::wire::{MessageType, HEADER_LEN};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::NetError;

/// A decoded frame: its type and raw payload (header stripped).
#[derive(Debug, Clone)]
pub struct Frame {
    pub message_type: MessageType,
    pub payload: Bytes,
}

/// Reads exactly one frame from `stream`. Returns `Ok(None)` on a clean EOF
/// before any bytes of a new frame arrive (the peer closed between
/// messages); a partial header or payload is `NetError::Io`/`PeerGone`.
pub async fn read_frame<R: AsyncRead + Unpin>(stream: &mut R) -> Result<Option<Frame>, NetError> {
    let mut header = [0u8; HEADER_LEN];
    match stream.read_exact(&mut header).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(NetError::Io(e)),
    }

    let message_type = MessageType::from_u8(header[0])?;
    let total_length = u32::from_le_bytes([header[1], header[2], header[3], header[4]]) as usize;
    if total_length < HEADER_LEN {
        return Err(NetError::Wire(strata_core::WireError::LengthMismatch {
            declared: total_length as u32,
            header: HEADER_LEN as u32,
        }));
    }
    let payload_len = total_length - HEADER_LEN;

    let mut payload = vec![0u8; payload_len];
    stream.read_exact(&mut payload).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            NetError::PeerGone
        } else {
            NetError::Io(e)
        }
    })?;

    Ok(Some(Frame { message_type, payload: Bytes::from(payload) }))
}

/// Writes one frame to `stream`: header followed by payload, in one write.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    stream: &mut W,
    message_type: MessageType,
    payload: &[u8],
) -> Result<(), NetError> {
    let total_length = (HEADER_LEN + payload.len()) as u32;
    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.push(message_type as u8);
    buf.extend_from_slice(&total_length.to_le_bytes());
    buf.extend_from_slice(payload);
    stream.write_all(&buf).await.map_err(NetError::Io)?;
    stream.flush().await.map_err(NetError::Io)?;
    Ok(())
}
