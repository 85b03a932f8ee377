//! Ingestion entry points — ways to build a dataframe and publish it to the
//! byte-store, chunk by chunk, under a user-visible key.
//!
//! Every producer below is expressed in terms of `RowWriter`: fill rows into
//! an in-memory `Full` dataframe capped at `CHUNK_SIZE` rows, publish that
//! chunk, repeat, then publish the assembled `DataFrameDescription` under
//! the top-level key. This is the one place `FullColumn::serialize_chunk`'s
//! "caller never holds more than one chunk's worth of rows" assumption is
//! actually enforced.

use bytes::Bytes;
use strata_core::key::Key;
use strata_store::{ByteArray, ByteStore};

use crate::column::CHUNK_SIZE;
use crate::dataframe::{DataFrame, RowWriter};
use crate::description::{ColumnDescription, DataFrameDescription};
use crate::error::FrameError;
use crate::row::Row;
use crate::schema::Schema;
use crate::value::Value;

/// Drives `writer` to exhaustion, publishing one chunk per `CHUNK_SIZE`
/// rows accumulated, then publishes the top-level description under
/// `user_key_name` homed on this node.
pub async fn from_visitor(
    store: &ByteStore,
    schema: &Schema,
    user_key_name: &str,
    mut writer: impl RowWriter,
) -> Result<(), FrameError> {
    let cluster_size = (store.directory().len().await as u32).max(1);
    let mut merged: Vec<ColumnDescription> = schema
        .kinds()
        .iter()
        .map(|k| ColumnDescription { kind: *k, total_length: 0, chunk_keys: Vec::new() })
        .collect();

    let mut chunk_idx = 0usize;
    loop {
        let mut chunk_df = DataFrame::empty(schema.clone());
        let mut row = Row::new(schema);
        let mut rows_in_chunk = 0usize;
        while rows_in_chunk < CHUNK_SIZE && !writer.done() {
            writer.visit(&mut row);
            chunk_df.add_row(&row);
            rows_in_chunk += 1;
        }
        if rows_in_chunk == 0 {
            break;
        }

        for (col_idx, (desc, bytes)) in chunk_df
            .column_descriptions_for_chunk(user_key_name, chunk_idx, cluster_size)
            .into_iter()
            .enumerate()
        {
            store.put(desc.chunk_keys[0].clone(), ByteArray::new(Bytes::from(bytes))).await?;
            merged[col_idx].total_length += desc.total_length;
            merged[col_idx].chunk_keys.push(desc.chunk_keys[0].clone());
        }

        chunk_idx += 1;
        if writer.done() {
            break;
        }
    }

    let description = DataFrameDescription { schema_string: schema.kind_string(), columns: merged };
    store.put(Key::new(user_key_name, store.self_node()), ByteArray::new(description.encode())).await?;
    Ok(())
}

struct LambdaWriter<F: FnMut(&mut Row, usize)> {
    produce: F,
    n: usize,
    next: usize,
}

impl<F: FnMut(&mut Row, usize)> RowWriter for LambdaWriter<F> {
    fn visit(&mut self, row: &mut Row) {
        (self.produce)(row, self.next);
        self.next += 1;
    }

    fn done(&self) -> bool {
        self.next >= self.n
    }
}

/// Publishes `n` rows produced by calling `produce(row, index)` for
/// `index` in `0..n`.
pub async fn from_lambda(
    store: &ByteStore,
    schema: &Schema,
    user_key_name: &str,
    n: usize,
    produce: impl FnMut(&mut Row, usize),
) -> Result<(), FrameError> {
    from_visitor(store, schema, user_key_name, LambdaWriter { produce, n, next: 0 }).await
}

struct ArrayWriter {
    rows: Vec<Vec<Value>>,
    next: usize,
}

impl RowWriter for ArrayWriter {
    fn visit(&mut self, row: &mut Row) {
        for (col, v) in self.rows[self.next].iter().enumerate() {
            match v {
                Value::Int(x) => row.set_int(col, *x),
                Value::Bool(x) => row.set_bool(col, *x),
                Value::Double(x) => row.set_double(col, *x),
                Value::String(x) => row.set_string(col, x.clone()),
            }
        }
        self.next += 1;
    }

    fn done(&self) -> bool {
        self.next >= self.rows.len()
    }
}

/// Publishes an already-materialized in-memory array of rows.
pub async fn from_array(
    store: &ByteStore,
    schema: &Schema,
    user_key_name: &str,
    rows: Vec<Vec<Value>>,
) -> Result<(), FrameError> {
    from_visitor(store, schema, user_key_name, ArrayWriter { rows, next: 0 }).await
}

/// Publishes a single scalar as a one-row, one-column dataframe.
pub async fn from_scalar(store: &ByteStore, user_key_name: &str, value: Value) -> Result<(), FrameError> {
    let mut schema = Schema::new();
    schema.add_column(value.kind(), None);
    from_array(store, &schema, user_key_name, vec![vec![value]]).await
}

struct SorWriter {
    rows: std::vec::IntoIter<Vec<strata_sor::SorValue>>,
    current: Option<Vec<strata_sor::SorValue>>,
}

impl SorWriter {
    fn new(rows: Vec<Vec<strata_sor::SorValue>>) -> Self {
        let mut rows = rows.into_iter();
        let current = rows.next();
        Self { rows, current }
    }
}

impl RowWriter for SorWriter {
    fn visit(&mut self, row: &mut Row) {
        let current = self.current.take().expect("visit called after done");
        for (col, v) in current.iter().enumerate() {
            match v {
                strata_sor::SorValue::Int(x) => row.set_int(col, *x),
                strata_sor::SorValue::Bool(x) => row.set_bool(col, *x),
                strata_sor::SorValue::Double(x) => row.set_double(col, *x),
                strata_sor::SorValue::String(x) => row.set_string(col, x.clone()),
            }
        }
        self.current = self.rows.next();
    }

    fn done(&self) -> bool {
        self.current.is_none()
    }
}

/// Infers a schema from a SoR text file, reads every row, and publishes
/// the result under `user_key_name`.
pub async fn from_file(
    store: &ByteStore,
    user_key_name: &str,
    path: &std::path::Path,
) -> Result<(), FrameError> {
    let sor_schema = strata_sor::infer_schema(path).map_err(|e| FrameError::MalformedSchema(e.to_string()))?;
    let rows = strata_sor::read_rows(path, &sor_schema).map_err(|e| FrameError::MalformedSchema(e.to_string()))?;

    let mut schema = Schema::new();
    for kind in sor_schema.kinds() {
        schema.add_column(*kind, None);
    }

    from_visitor(store, &schema, user_key_name, SorWriter::new(rows)).await
}
