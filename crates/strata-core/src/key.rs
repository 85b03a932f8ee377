//! Key — a (name, home node) pair identifying a byte-store entry.

use bytes::{Buf, BufMut};

use crate::error::WireError;

pub type NodeId = u32;

/// A byte-store key. `node` is the *home* of the key: the only node whose
/// byte-store physically stores the bytes. Keys are plain values, freely
/// copied and compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pub name: String,
    pub node: NodeId,
}

impl Key {
    pub fn new(name: impl Into<String>, node: NodeId) -> Self {
        Self { name: name.into(), node }
    }

    /// Wire size of this key: `[u64 len][len bytes][u32 node]`.
    pub fn encoded_len(&self) -> usize {
        8 + self.name.len() + 4
    }

    pub fn encode(&self, out: &mut impl BufMut) {
        out.put_u64_le(self.name.len() as u64);
        out.put_slice(self.name.as_bytes());
        out.put_u32_le(self.node);
    }

    pub fn decode(buf: &mut impl Buf) -> Result<Self, WireError> {
        if buf.remaining() < 8 {
            return Err(WireError::Truncated { need: 8, have: buf.remaining() });
        }
        let len = buf.get_u64_le() as usize;
        if buf.remaining() < len + 4 {
            return Err(WireError::Truncated { need: len + 4, have: buf.remaining() });
        }
        let mut name_bytes = vec![0u8; len];
        buf.copy_to_slice(&mut name_bytes);
        let name = String::from_utf8(name_bytes).map_err(|_| WireError::InvalidUtf8)?;
        let node = buf.get_u32_le();
        Ok(Key { name, node })
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.node)
    }
}
