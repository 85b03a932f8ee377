//! Byte-store errors. `Absent` is deliberately not a variant here: a key
//! simply not being present yet is a normal outcome the caller decides on,
//! modeled as `Option::None` rather than an `Err`.

use strata_net::NetError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("remote byte-store call failed: {0}")]
    Remote(#[from] NetError),

    #[error("key {0} has no known home node in the cluster directory")]
    UnknownHome(strata_core::Key),
}
