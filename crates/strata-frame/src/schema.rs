//! Schema — an ordered sequence of column kinds plus an optional name per
//! column.

use strata_core::ColumnKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    kinds: Vec<ColumnKind>,
    names: Vec<Option<String>>,
}

impl Schema {
    pub fn new() -> Self {
        Self { kinds: Vec::new(), names: Vec::new() }
    }

    /// Builds a schema from a compact kind string, e.g. `"III"` or `"IBD"`.
    /// Unnamed columns throughout.
    pub fn from_kind_string(s: &str) -> Result<Self, strata_core::WireError> {
        let mut schema = Schema::new();
        for byte in s.bytes() {
            schema.add_column(ColumnKind::from_tag(byte)?, None);
        }
        Ok(schema)
    }

    pub fn add_column(&mut self, kind: ColumnKind, name: Option<String>) {
        self.kinds.push(kind);
        self.names.push(name);
    }

    pub fn width(&self) -> usize {
        self.kinds.len()
    }

    pub fn kind(&self, col: usize) -> ColumnKind {
        self.kinds[col]
    }

    pub fn name(&self, col: usize) -> Option<&str> {
        self.names[col].as_deref()
    }

    /// Returns the index of the named column, or `None` if absent.
    pub fn col_idx(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.as_deref() == Some(name))
    }

    /// The compact kind string this schema serializes to, e.g. `"III"`.
    pub fn kind_string(&self) -> String {
        self.kinds.iter().map(|k| k.tag() as char).collect()
    }

    pub fn kinds(&self) -> &[ColumnKind] {
        &self.kinds
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}
