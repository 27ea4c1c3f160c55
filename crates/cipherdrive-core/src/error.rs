//! Error types for cipherdrive core.

use thiserror::Error;

/// Errors raised while parsing core types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("empty account id")]
    EmptyAccountId,

    #[error("empty content id")]
    EmptyContentId,
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
