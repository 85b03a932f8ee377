//! Wire format for all strata communication.
//!
//! Every message on any connection (rendezvous or peer-to-peer) is prefixed
//! by the same 5-byte header: a 1-byte message type followed by a 4-byte
//! little-endian total length (header included). `strata-net::framing` reads
//! and writes that header; this module owns the typed payloads that live
//! inside it.
//!
//! Unlike a fixed-layout `#[repr(C)]` wire struct, these payloads are
//! variable-length (strings, chunk key lists), so they are encoded by hand
//! into a `BytesMut` rather than reinterpreted in place.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::WireError;
use crate::key::{Key, NodeId};

pub const HEADER_LEN: usize = 5;

/// Top-level message type discriminant, carried in the frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Handshake = 0,
    ClientInfo = 1,
    Data = 2,
    Teardown = 3,
}

impl MessageType {
    pub fn from_u8(v: u8) -> Result<Self, WireError> {
        match v {
            0 => Ok(MessageType::Handshake),
            1 => Ok(MessageType::ClientInfo),
            2 => Ok(MessageType::Data),
            3 => Ok(MessageType::Teardown),
            other => Err(WireError::UnknownMessageType(other)),
        }
    }
}

/// Sub-type discriminant for messages carried inside a `Data` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum KbMessageType {
    Put = 0,
    Get = 1,
    GetAndWait = 2,
    ResponseData = 3,
    Ack = 4,
}

impl KbMessageType {
    pub fn from_u8(v: u8) -> Result<Self, WireError> {
        match v {
            0 => Ok(KbMessageType::Put),
            1 => Ok(KbMessageType::Get),
            2 => Ok(KbMessageType::GetAndWait),
            3 => Ok(KbMessageType::ResponseData),
            4 => Ok(KbMessageType::Ack),
            other => Err(WireError::UnknownKbMessageType(other)),
        }
    }
}

/// `Handshake{ip, port}` sent by a node to the rendezvous server on connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handshake {
    pub ip: u32,
    pub port: u16,
}

impl Handshake {
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(6);
        buf.put_u32_le(self.ip);
        buf.put_u16_le(self.port);
        buf.freeze()
    }

    pub fn decode(mut payload: Bytes) -> Result<Self, WireError> {
        if payload.remaining() < 6 {
            return Err(WireError::Truncated { need: 6, have: payload.remaining() });
        }
        Ok(Handshake { ip: payload.get_u32_le(), port: payload.get_u16_le() })
    }
}

/// Response to a handshake: the assigned node id, carried as a `Data` payload
/// per the external interface contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeResponse {
    pub node_id: NodeId,
}

impl HandshakeResponse {
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(4);
        buf.put_u32_le(self.node_id);
        buf.freeze()
    }

    pub fn decode(mut payload: Bytes) -> Result<Self, WireError> {
        if payload.remaining() < 4 {
            return Err(WireError::Truncated { need: 4, have: payload.remaining() });
        }
        Ok(HandshakeResponse { node_id: payload.get_u32_le() })
    }
}

/// One cluster member as carried inside `ClientInfo`: `(port, ip)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterMember {
    pub port: u16,
    pub ip: u32,
}

/// `ClientInfo{n, [(port, ip)...]}` — the full cluster directory, broadcast
/// by the rendezvous server to every client on membership change. A
/// member's index in `members` is its node id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub members: Vec<ClusterMember>,
}

impl ClientInfo {
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(4 + self.members.len() * 6);
        buf.put_u32_le(self.members.len() as u32);
        for m in &self.members {
            buf.put_u16_le(m.port);
            buf.put_u32_le(m.ip);
        }
        buf.freeze()
    }

    pub fn decode(mut payload: Bytes) -> Result<Self, WireError> {
        if payload.remaining() < 4 {
            return Err(WireError::Truncated { need: 4, have: payload.remaining() });
        }
        let n = payload.get_u32_le() as usize;
        let mut members = Vec::with_capacity(n);
        for _ in 0..n {
            if payload.remaining() < 6 {
                return Err(WireError::Truncated { need: 6, have: payload.remaining() });
            }
            let port = payload.get_u16_le();
            let ip = payload.get_u32_le();
            members.push(ClusterMember { port, ip });
        }
        Ok(ClientInfo { members })
    }
}

/// A `KBMessage`: the sub-type plus its payload, wrapped inside a `Data`
/// frame. `Put` carries `[key][bytes...]`; `Get`/`GetAndWait` carry
/// `[key]`; `ResponseData` carries `[bytes...]` (possibly empty); `Ack`
/// carries nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KbMessage {
    Put { key: Key, bytes: Bytes },
    Get { key: Key },
    GetAndWait { key: Key },
    ResponseData { bytes: Bytes },
    Ack,
}

impl KbMessage {
    fn sub_type(&self) -> KbMessageType {
        match self {
            KbMessage::Put { .. } => KbMessageType::Put,
            KbMessage::Get { .. } => KbMessageType::Get,
            KbMessage::GetAndWait { .. } => KbMessageType::GetAndWait,
            KbMessage::ResponseData { .. } => KbMessageType::ResponseData,
            KbMessage::Ack => KbMessageType::Ack,
        }
    }

    /// Encode into the bytes that go inside a `Data` frame's payload: the
    /// sub-type byte followed by the sub-type-specific body.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(self.sub_type() as u8);
        match self {
            KbMessage::Put { key, bytes } => {
                key.encode(&mut buf);
                buf.put_slice(bytes);
            }
            KbMessage::Get { key } | KbMessage::GetAndWait { key } => {
                key.encode(&mut buf);
            }
            KbMessage::ResponseData { bytes } => {
                buf.put_slice(bytes);
            }
            KbMessage::Ack => {}
        }
        buf.freeze()
    }

    pub fn decode(mut payload: Bytes) -> Result<Self, WireError> {
        if payload.remaining() < 1 {
            return Err(WireError::Truncated { need: 1, have: 0 });
        }
        let sub_type = KbMessageType::from_u8(payload.get_u8())?;
        match sub_type {
            KbMessageType::Put => {
                let key = Key::decode(&mut payload)?;
                let bytes = payload.copy_to_bytes(payload.remaining());
                Ok(KbMessage::Put { key, bytes })
            }
            KbMessageType::Get => Ok(KbMessage::Get { key: Key::decode(&mut payload)? }),
            KbMessageType::GetAndWait => {
                Ok(KbMessage::GetAndWait { key: Key::decode(&mut payload)? })
            }
            KbMessageType::ResponseData => {
                let bytes = payload.copy_to_bytes(payload.remaining());
                Ok(KbMessage::ResponseData { bytes })
            }
            KbMessageType::Ack => Ok(KbMessage::Ack),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_round_trips() {
        let hs = Handshake { ip: 0x7f000001, port: 9001 };
        let decoded = Handshake::decode(hs.encode()).unwrap();
        assert_eq!(decoded, hs);
    }

    #[test]
    fn handshake_response_round_trips() {
        let resp = HandshakeResponse { node_id: 3 };
        let decoded = HandshakeResponse::decode(resp.encode()).unwrap();
        assert_eq!(decoded, resp);
    }

    #[test]
    fn client_info_round_trips_with_literal_values() {
        let info = ClientInfo {
            members: vec![
                ClusterMember { port: 25565, ip: 2602665218 },
                ClusterMember { port: 35565, ip: 16777343 },
            ],
        };
        let decoded = ClientInfo::decode(info.encode()).unwrap();
        assert_eq!(decoded, info);
    }

    #[test]
    fn client_info_with_zero_members_round_trips() {
        let info = ClientInfo { members: vec![] };
        assert_eq!(ClientInfo::decode(info.encode()).unwrap(), info);
    }

    #[test]
    fn kbmessage_put_round_trips() {
        let msg = KbMessage::Put {
            key: Key::new("m-0-0", 1),
            bytes: Bytes::from_static(b"payload"),
        };
        assert_eq!(KbMessage::decode(msg.encode()).unwrap(), msg);
    }

    #[test]
    fn kbmessage_ack_round_trips() {
        assert_eq!(KbMessage::decode(KbMessage::Ack.encode()).unwrap(), KbMessage::Ack);
    }

    #[test]
    fn kbmessage_response_data_may_be_empty() {
        let msg = KbMessage::ResponseData { bytes: Bytes::new() };
        assert_eq!(KbMessage::decode(msg.encode()).unwrap(), msg);
    }

    #[test]
    fn message_type_rejects_unknown_discriminant() {
        assert_eq!(MessageType::from_u8(200), Err(WireError::UnknownMessageType(200)));
    }
}
