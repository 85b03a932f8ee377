//! Error taxonomy shared by the core wire format and configuration loader.
//! Layers above (`strata-net`, `strata-store`, `strata-frame`) define their
//! own error types and wrap these where appropriate.

use std::path::PathBuf;

/// Errors raised while decoding or encoding a wire message.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WireError {
    #[error("message too short: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    #[error("unknown message type discriminant {0}")]
    UnknownMessageType(u8),

    #[error("unknown KBMessage sub-type discriminant {0}")]
    UnknownKbMessageType(u8),

    #[error("unknown column kind tag {0:?}")]
    UnknownColumnKind(u8),

    #[error("declared length {declared} does not match frame header total_length {header}")]
    LengthMismatch { declared: u32, header: u32 },

    #[error("string field is not valid UTF-8")]
    InvalidUtf8,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}
