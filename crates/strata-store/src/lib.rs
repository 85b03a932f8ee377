//! strata-store — the per-node byte-store: local map, readiness gates, and
//! remote dispatch to peers over `strata-net`.

pub mod byte_array;
pub mod byte_store;
pub mod error;
pub mod handler;
pub mod readiness;

pub use byte_array::ByteArray;
pub use byte_store::ByteStore;
pub use error::StoreError;
pub use readiness::ReadinessGate;
