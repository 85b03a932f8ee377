//! ByteArray — an owned immutable blob. The only thing the byte-store
//! stores. Cheap to clone (`bytes::Bytes` is refcounted).

use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteArray(Bytes);

impl ByteArray {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &Bytes {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<Bytes> for ByteArray {
    fn from(b: Bytes) -> Self {
        Self(b)
    }
}

impl From<Vec<u8>> for ByteArray {
    fn from(v: Vec<u8>) -> Self {
        Self(Bytes::from(v))
    }
}
