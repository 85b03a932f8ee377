//! Row — a transient, schema-bound buffer of typed slots. Not a stored
//! entity: `DataFrame::add_row` copies slot values into its columns.

use crate::schema::Schema;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct Row {
    slots: Vec<Value>,
}

impl Row {
    /// Builds a row bound to `schema`'s width, with every slot defaulted
    /// per its column kind.
    pub fn new(schema: &Schema) -> Self {
        let slots = schema
            .kinds()
            .iter()
            .map(|kind| match kind {
                strata_core::ColumnKind::Int => Value::Int(0),
                strata_core::ColumnKind::Bool => Value::Bool(false),
                strata_core::ColumnKind::Double => Value::Double(0.0),
                strata_core::ColumnKind::String => Value::String(String::new()),
            })
            .collect();
        Self { slots }
    }

    pub fn width(&self) -> usize {
        self.slots.len()
    }

    pub fn set_int(&mut self, col: usize, v: i64) {
        self.slots[col] = Value::Int(v);
    }

    pub fn set_bool(&mut self, col: usize, v: bool) {
        self.slots[col] = Value::Bool(v);
    }

    pub fn set_double(&mut self, col: usize, v: f64) {
        self.slots[col] = Value::Double(v);
    }

    pub fn set_string(&mut self, col: usize, v: impl Into<String>) {
        self.slots[col] = Value::String(v.into());
    }

    /// Informational: records which column a caller last touched. A no-op
    /// hook rather than state, since nothing downstream reads it.
    pub fn set_idx(&self, _col: usize) {}

    pub fn get(&self, col: usize) -> &Value {
        &self.slots[col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::ColumnKind;

    #[test]
    fn new_row_defaults_every_slot() {
        let mut schema = Schema::new();
        schema.add_column(ColumnKind::Int, None);
        schema.add_column(ColumnKind::String, None);
        let row = Row::new(&schema);
        assert_eq!(row.get(0).as_int(), 0);
        assert_eq!(row.get(1).as_str(), "");
    }

    #[test]
    fn setters_overwrite_defaults() {
        let mut schema = Schema::new();
        schema.add_column(ColumnKind::Double, None);
        let mut row = Row::new(&schema);
        row.set_double(0, 42.0);
        assert_eq!(row.get(0).as_double(), 42.0);
    }
}
