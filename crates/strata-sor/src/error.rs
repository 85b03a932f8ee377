//! Errors surfaced while reading a SoR file.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SorError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, #[source] source: std::io::Error },

    #[error("no column was ever observed, schema could not be inferred")]
    MalformedSchema,
}
