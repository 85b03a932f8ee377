//! strata-core — shared types, wire format, and configuration.
//! Every other strata crate depends on this one.

pub mod column_kind;
pub mod config;
pub mod error;
pub mod key;
pub mod wire;

pub use column_kind::ColumnKind;
pub use error::{ConfigError, WireError};
pub use key::Key;
