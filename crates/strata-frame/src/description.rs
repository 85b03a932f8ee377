//! DataFrame description — the "index object" stored under the user-visible
//! key on its home node: the schema string plus, per column, the list of
//! chunk keys scattered across the cluster.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use strata_core::key::Key;
use strata_core::ColumnKind;

use crate::error::FrameError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescription {
    pub kind: ColumnKind,
    pub total_length: u64,
    pub chunk_keys: Vec<Key>,
}

impl ColumnDescription {
    pub fn chunk_count(&self) -> u64 {
        self.chunk_keys.len() as u64
    }

    /// `[u64 chunks][u64 total_length][u8 kind][chunks × key]`
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u64_le(self.chunk_count());
        buf.put_u64_le(self.total_length);
        buf.put_u8(self.kind.tag());
        for key in &self.chunk_keys {
            key.encode(buf);
        }
    }

    fn decode(buf: &mut Bytes) -> Result<Self, FrameError> {
        if buf.remaining() < 17 {
            return Err(strata_core::WireError::Truncated { need: 17, have: buf.remaining() }.into());
        }
        let chunks = buf.get_u64_le() as usize;
        let total_length = buf.get_u64_le();
        let kind = ColumnKind::from_tag(buf.get_u8())?;
        let mut chunk_keys = Vec::with_capacity(chunks);
        for _ in 0..chunks {
            chunk_keys.push(Key::decode(buf)?);
        }
        Ok(ColumnDescription { kind, total_length, chunk_keys })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFrameDescription {
    pub schema_string: String,
    pub columns: Vec<ColumnDescription>,
}

impl DataFrameDescription {
    /// `[string schema][u64 num_cols][num_cols × ColumnDescription]`
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u64_le(self.schema_string.len() as u64);
        buf.put_slice(self.schema_string.as_bytes());
        buf.put_u64_le(self.columns.len() as u64);
        for col in &self.columns {
            col.encode(&mut buf);
        }
        buf.freeze()
    }

    pub fn decode(bytes: Bytes) -> Result<Self, FrameError> {
        let mut buf = bytes;
        if buf.remaining() < 8 {
            return Err(strata_core::WireError::Truncated { need: 8, have: buf.remaining() }.into());
        }
        let schema_len = buf.get_u64_le() as usize;
        if buf.remaining() < schema_len + 8 {
            return Err(
                strata_core::WireError::Truncated { need: schema_len + 8, have: buf.remaining() }.into(),
            );
        }
        let mut schema_bytes = vec![0u8; schema_len];
        buf.copy_to_slice(&mut schema_bytes);
        let schema_string =
            String::from_utf8(schema_bytes).map_err(|_| strata_core::WireError::InvalidUtf8)?;

        let num_cols = buf.get_u64_le() as usize;
        let mut columns = Vec::with_capacity(num_cols);
        for _ in 0..num_cols {
            columns.push(ColumnDescription::decode(&mut buf)?);
        }
        Ok(DataFrameDescription { schema_string, columns })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_wire_bytes() {
        let desc = DataFrameDescription {
            schema_string: "III".to_string(),
            columns: vec![
                ColumnDescription {
                    kind: ColumnKind::Int,
                    total_length: 8,
                    chunk_keys: vec![Key::new("projects-0-0", 0)],
                },
                ColumnDescription {
                    kind: ColumnKind::Int,
                    total_length: 8,
                    chunk_keys: vec![Key::new("authors-1-0", 1)],
                },
            ],
        };
        let decoded = DataFrameDescription::decode(desc.encode()).unwrap();
        assert_eq!(decoded, desc);
    }

    #[test]
    fn two_chunk_column_description_round_trips() {
        let desc = ColumnDescription {
            kind: ColumnKind::Double,
            total_length: 2_500_001,
            chunk_keys: vec![Key::new("m-0-0", 0), Key::new("m-0-1", 1)],
        };
        let wrapper = DataFrameDescription { schema_string: "D".to_string(), columns: vec![desc] };
        let decoded = DataFrameDescription::decode(wrapper.encode()).unwrap();
        assert_eq!(decoded.columns[0].chunk_count(), 2);
        assert_eq!(decoded.columns[0].chunk_keys[0].node, 0);
        assert_eq!(decoded.columns[0].chunk_keys[1].node, 1);
    }
}
