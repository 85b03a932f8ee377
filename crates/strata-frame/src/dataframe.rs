//! DataFrame — `(schema, columns[])`; all columns share one `nrows`.

use strata_core::key::Key;
use strata_store::ByteStore;

use crate::column::{Column, Storage, CHUNK_SIZE};
use crate::description::{ColumnDescription, DataFrameDescription};
use crate::error::FrameError;
use crate::row::Row;
use crate::schema::Schema;
use crate::value::Value;

/// Visits fully-materialized rows in order. `DataFrame::map`/`local_map`
/// drive this; `visit` itself never touches the byte-store.
pub trait RowVisitor {
    fn visit(&mut self, row: &Row);
}

/// Drives `DataFrame::build_from_lambda`: `visit` fills the next row,
/// `done` gates the loop.
pub trait RowWriter {
    fn visit(&mut self, row: &mut Row);
    fn done(&self) -> bool;
}

pub struct DataFrame {
    schema: Schema,
    columns: Vec<Column>,
    nrows: usize,
}

impl DataFrame {
    pub fn empty(schema: Schema) -> Self {
        let columns = schema
            .kinds()
            .iter()
            .map(|kind| match kind {
                strata_core::ColumnKind::Int => Column::Int(Storage::Full(Default::default())),
                strata_core::ColumnKind::Bool => Column::Bool(Storage::Full(Default::default())),
                strata_core::ColumnKind::Double => Column::Double(Storage::Full(Default::default())),
                strata_core::ColumnKind::String => Column::String(Storage::Full(Default::default())),
            })
            .collect();
        Self { schema, columns, nrows: 0 }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// Appends a column built elsewhere (e.g. a materialized `Chunked`
    /// column from `load`). Rejects a duplicate name or a length mismatch
    /// against existing columns.
    pub fn add_column(&mut self, col: Column, name: Option<String>) -> Result<(), FrameError> {
        if let Some(n) = &name {
            if self.schema.col_idx(n).is_some() {
                return Err(FrameError::DuplicateColumnName(n.clone()));
            }
        }
        if !self.columns.is_empty() && col.size() != self.nrows {
            return Err(FrameError::LengthMismatch { expected: self.nrows, actual: col.size() });
        }
        if self.columns.is_empty() {
            self.nrows = col.size();
        }
        self.schema.add_column(col.kind(), name);
        self.columns.push(col);
        Ok(())
    }

    /// Pushes `row`'s typed slots onto each column. Only valid against
    /// `Full` columns — the ingestion paths are the only callers and never
    /// build on top of `Chunked` storage.
    pub fn add_row(&mut self, row: &Row) {
        for (i, col) in self.columns.iter_mut().enumerate() {
            match (col, row.get(i)) {
                (Column::Int(Storage::Full(c)), Value::Int(v)) => c.push_back(*v),
                (Column::Bool(Storage::Full(c)), Value::Bool(v)) => c.push_back(*v),
                (Column::Double(Storage::Full(c)), Value::Double(v)) => c.push_back(*v),
                (Column::String(Storage::Full(c)), Value::String(v)) => c.push_back(v.clone()),
                _ => panic!("add_row: column kind mismatch or column is not a Full column"),
            }
        }
        self.nrows += 1;
    }

    pub async fn get_int(&self, store: &ByteStore, col: usize, row: usize) -> Result<i64, FrameError> {
        match self.get_value(store, col, row).await? {
            Value::Int(v) => Ok(v),
            _ => panic!("get_int: column is not Int"),
        }
    }

    pub async fn get_bool(&self, store: &ByteStore, col: usize, row: usize) -> Result<bool, FrameError> {
        match self.get_value(store, col, row).await? {
            Value::Bool(v) => Ok(v),
            _ => panic!("get_bool: column is not Bool"),
        }
    }

    pub async fn get_double(&self, store: &ByteStore, col: usize, row: usize) -> Result<f64, FrameError> {
        match self.get_value(store, col, row).await? {
            Value::Double(v) => Ok(v),
            _ => panic!("get_double: column is not Double"),
        }
    }

    pub async fn get_string(&self, store: &ByteStore, col: usize, row: usize) -> Result<String, FrameError> {
        match self.get_value(store, col, row).await? {
            Value::String(v) => Ok(v),
            _ => panic!("get_string: column is not String"),
        }
    }

    async fn get_value(&self, store: &ByteStore, col: usize, row: usize) -> Result<Value, FrameError> {
        Ok(match &self.columns[col] {
            Column::Int(Storage::Full(c)) => Value::Int(*c.get(row)),
            Column::Int(Storage::Chunked(c)) => Value::Int(c.get(row, store).await?),
            Column::Bool(Storage::Full(c)) => Value::Bool(*c.get(row)),
            Column::Bool(Storage::Chunked(c)) => Value::Bool(c.get(row, store).await?),
            Column::Double(Storage::Full(c)) => Value::Double(*c.get(row)),
            Column::Double(Storage::Chunked(c)) => Value::Double(c.get(row, store).await?),
            Column::String(Storage::Full(c)) => Value::String(c.get(row).clone()),
            Column::String(Storage::Chunked(c)) => Value::String(c.get(row, store).await?),
        })
    }

    pub async fn fill_row(&self, store: &ByteStore, row_idx: usize, row: &mut Row) -> Result<(), FrameError> {
        for col in 0..self.ncols() {
            match self.get_value(store, col, row_idx).await? {
                Value::Int(v) => row.set_int(col, v),
                Value::Bool(v) => row.set_bool(col, v),
                Value::Double(v) => row.set_double(col, v),
                Value::String(v) => row.set_string(col, v),
            }
        }
        Ok(())
    }

    /// For each row index, fills a shared `Row` buffer and invokes
    /// `visitor.visit`.
    pub async fn map(&self, store: &ByteStore, visitor: &mut impl RowVisitor) -> Result<(), FrameError> {
        let mut row = Row::new(&self.schema);
        for i in 0..self.nrows {
            self.fill_row(store, i, &mut row).await?;
            visitor.visit(&row);
        }
        Ok(())
    }

    /// Only meaningful when column 0 is a `Chunked` column: visits every
    /// row of every chunk of column 0 that is local to this node, skipping
    /// chunks owned by other nodes. If column 0 is a `Full` column this is
    /// a documented no-op (DESIGN NOTES) — tests must exercise locality
    /// against a post-`put` (round-tripped) dataframe.
    pub async fn local_map(&self, store: &ByteStore, visitor: &mut impl RowVisitor) -> Result<(), FrameError> {
        if self.columns.is_empty() {
            return Ok(());
        }
        let chunk_count = self.columns[0].chunk_count();
        if matches!(&self.columns[0], Column::Int(Storage::Full(_)))
            || matches!(&self.columns[0], Column::Bool(Storage::Full(_)))
            || matches!(&self.columns[0], Column::Double(Storage::Full(_)))
            || matches!(&self.columns[0], Column::String(Storage::Full(_)))
        {
            return Ok(());
        }

        let mut row = Row::new(&self.schema);
        for c in 0..chunk_count {
            if !self.columns[0].is_local_chunk(c) {
                continue;
            }
            let start = c * CHUNK_SIZE;
            let end = (start + CHUNK_SIZE).min(self.nrows);
            for i in start..end {
                self.fill_row(store, i, &mut row).await?;
                visitor.visit(&row);
            }
        }
        Ok(())
    }

    /// Builds a `DataFrameDescription` for this (fully in-memory) dataframe
    /// by deriving chunk keys for a single logical chunk `chunk_idx`. Used by
    /// the ingestion primitive to assemble the index object incrementally as
    /// chunks are published.
    pub(crate) fn column_descriptions_for_chunk(
        &self,
        user_key_name: &str,
        chunk_idx: usize,
        cluster_size: u32,
    ) -> Vec<(ColumnDescription, Vec<u8>)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(col_idx, col)| {
                let key = crate::key_derive::chunk_key(user_key_name, col_idx, chunk_idx, cluster_size);
                let bytes = serialize_full_column(col);
                (
                    ColumnDescription { kind: col.kind(), total_length: col.size() as u64, chunk_keys: vec![key] },
                    bytes,
                )
            })
            .collect()
    }
}

fn serialize_full_column(col: &Column) -> Vec<u8> {
    match col {
        Column::Int(Storage::Full(c)) => c.serialize_chunk().to_vec(),
        Column::Bool(Storage::Full(c)) => c.serialize_chunk().to_vec(),
        Column::Double(Storage::Full(c)) => c.serialize_chunk().to_vec(),
        Column::String(Storage::Full(c)) => c.serialize_chunk().to_vec(),
        _ => panic!("serialize_full_column: column is not Full"),
    }
}

/// Fetches a dataframe description non-blockingly; returns `Ok(None)` if
/// nothing has been published under `key` yet.
pub async fn load(store: &ByteStore, key: &Key) -> Result<Option<DataFrame>, FrameError> {
    match store.get(key).await? {
        None => Ok(None),
        Some(bytes) => Ok(Some(build_from_description(
            DataFrameDescription::decode(bytes.into_bytes())?,
            store.self_node(),
        )?)),
    }
}

/// Fetches a dataframe description, blocking until it has been published by
/// a producer on another node.
pub async fn load_blocking(store: &ByteStore, key: &Key) -> Result<DataFrame, FrameError> {
    let bytes = store.wait_and_get(key).await?;
    build_from_description(DataFrameDescription::decode(bytes.into_bytes())?, store.self_node())
}

fn build_from_description(desc: DataFrameDescription, self_node: u32) -> Result<DataFrame, FrameError> {
    let schema = Schema::from_kind_string(&desc.schema_string)?;
    let mut df = DataFrame { schema, columns: Vec::new(), nrows: 0 };
    for col_desc in desc.columns {
        let total_length = col_desc.total_length;
        let column = match col_desc.kind {
            strata_core::ColumnKind::Int => Column::Int(Storage::Chunked(crate::column::ChunkedColumn::new(
                col_desc.chunk_keys,
                total_length,
                self_node,
            ))),
            strata_core::ColumnKind::Bool => Column::Bool(Storage::Chunked(crate::column::ChunkedColumn::new(
                col_desc.chunk_keys,
                total_length,
                self_node,
            ))),
            strata_core::ColumnKind::Double => {
                Column::Double(Storage::Chunked(crate::column::ChunkedColumn::new(
                    col_desc.chunk_keys,
                    total_length,
                    self_node,
                )))
            }
            strata_core::ColumnKind::String => {
                Column::String(Storage::Chunked(crate::column::ChunkedColumn::new(
                    col_desc.chunk_keys,
                    total_length,
                    self_node,
                )))
            }
        };
        df.nrows = total_length as usize;
        df.columns.push(column);
    }
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::ColumnKind;
    use strata_net::ClusterDirectory;

    fn store() -> ByteStore {
        ByteStore::new(0, ClusterDirectory::new())
    }

    fn schema() -> Schema {
        let mut s = Schema::new();
        s.add_column(ColumnKind::Int, None);
        s.add_column(ColumnKind::String, None);
        s
    }

    #[tokio::test]
    async fn add_row_then_get_round_trips_on_full_storage() {
        let store = store();
        let schema = schema();
        let mut df = DataFrame::empty(schema.clone());
        let mut row = Row::new(&schema);
        row.set_int(0, 7);
        row.set_string(1, "x");
        df.add_row(&row);

        assert_eq!(df.nrows(), 1);
        assert_eq!(df.get_int(&store, 0, 0).await.unwrap(), 7);
        assert_eq!(df.get_string(&store, 1, 0).await.unwrap(), "x");
    }

    #[tokio::test]
    async fn map_visits_every_row_in_order() {
        let store = store();
        let schema = schema();
        let mut df = DataFrame::empty(schema.clone());
        for i in 0..3 {
            let mut row = Row::new(&schema);
            row.set_int(0, i);
            row.set_string(1, format!("s{i}"));
            df.add_row(&row);
        }

        struct Collect(Vec<i64>);
        impl RowVisitor for Collect {
            fn visit(&mut self, row: &Row) {
                self.0.push(row.get(0).as_int());
            }
        }

        let mut collector = Collect(Vec::new());
        df.map(&store, &mut collector).await.unwrap();
        assert_eq!(collector.0, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn local_map_is_a_no_op_on_full_storage() {
        let store = store();
        let schema = schema();
        let mut df = DataFrame::empty(schema.clone());
        let mut row = Row::new(&schema);
        row.set_int(0, 1);
        df.add_row(&row);

        struct Counter(usize);
        impl RowVisitor for Counter {
            fn visit(&mut self, _row: &Row) {
                self.0 += 1;
            }
        }

        let mut counter = Counter(0);
        df.local_map(&store, &mut counter).await.unwrap();
        assert_eq!(counter.0, 0);
    }

    #[tokio::test]
    async fn add_column_rejects_duplicate_name() {
        let mut df = DataFrame::empty(Schema::new());
        df.add_column(Column::Int(Storage::Full(Default::default())), Some("a".to_string())).unwrap();
        let err = df
            .add_column(Column::Bool(Storage::Full(Default::default())), Some("a".to_string()))
            .unwrap_err();
        assert!(matches!(err, FrameError::DuplicateColumnName(_)));
    }
}
