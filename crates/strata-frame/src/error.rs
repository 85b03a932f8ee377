//! Dataframe-layer errors.

use strata_core::WireError;
use strata_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("schema inference found a column with no typed token: {0}")]
    MalformedSchema(String),

    #[error("duplicate column name: {0}")]
    DuplicateColumnName(String),

    #[error("column length mismatch: existing columns have {expected} rows, new column has {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("byte-store error: {0}")]
    Store(#[from] StoreError),

    #[error("wire decode error: {0}")]
    Wire(#[from] WireError),
}
