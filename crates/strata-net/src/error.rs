//! Network-layer errors. Wraps `strata_core::WireError` and adds the
//! connection-loss failure mode peer RPCs can hit.

use strata_core::WireError;

#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("wire decode error: {0}")]
    Wire(#[from] WireError),

    #[error("peer connection lost")]
    PeerGone,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
