//! Error types for the store module.

use thiserror::Error;

use cipherdrive_core::ContentId;

/// Errors from local persistence (the vault store).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A record already exists for this key.
    #[error("record already exists: {0}")]
    AlreadyExists(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Lock poisoned or blocking task failed.
    #[error("storage task failed: {0}")]
    Task(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors reported by a ledger adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The ledger could not be reached or did not answer.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The ledger refused the write.
    #[error("ledger rejected the request: {0}")]
    Rejected(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Errors reported by a blob store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlobError {
    /// No blob with this content id.
    #[error("blob not found: {0}")]
    NotFound(ContentId),

    /// The store could not be reached or did not answer.
    #[error("blob store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for blob operations.
pub type BlobResult<T> = std::result::Result<T, BlobError>;
