//! Error types for drive operations.

use thiserror::Error;

use cipherdrive_core::{AccountId, ContentId, CoreError};
use cipherdrive_crypto::CryptoError;
use cipherdrive_store::{BlobError, LedgerError, StoreError};

/// Errors that can occur during drive operations.
#[derive(Debug, Error)]
pub enum DriveError {
    /// Vault could not be opened: wrong passphrase or corrupt record.
    #[error("authentication failed")]
    Authentication,

    /// A blob failed authenticated decryption.
    #[error("integrity check failed")]
    Integrity,

    /// Malformed blob, hex string or key.
    #[error("malformed data: {0}")]
    Format(String),

    /// A wrapped key could not be opened.
    #[error("key unwrap failed")]
    KeyUnwrap,

    /// The recipient has no published public key.
    #[error("recipient {0} has not registered a public key")]
    RecipientNotRegistered(AccountId),

    /// The account holds no grant for this file.
    #[error("access denied to file {0}")]
    AccessDenied(ContentId),

    /// The ledger could not be reached.
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    /// The ledger refused a write.
    #[error("ledger rejected the request: {0}")]
    LedgerRejected(String),

    /// No blob source could serve the file.
    #[error("blob unavailable: {0}")]
    BlobUnavailable(#[from] BlobError),

    /// The unlocked key does not match the account's published key.
    #[error("local key for {0} does not match the published public key")]
    IdentityMismatch(AccountId),

    /// The account already has a published key but no vault on this device.
    #[error("account {0} is already registered from another device")]
    AlreadyRegistered(AccountId),

    /// A vault already exists for this account.
    #[error("a vault already exists for {0}")]
    VaultExists(AccountId),

    /// No vault exists for this account.
    #[error("no vault for {0}")]
    NoVault(AccountId),

    /// The sharer of a grant has no published public key.
    #[error("sharer {0} has no published public key")]
    UnknownSender(AccountId),

    /// Upload exceeds the configured limit.
    #[error("file is {size} bytes, limit is {limit}")]
    FileTooLarge { size: u64, limit: u64 },

    /// New passphrase is shorter than the configured minimum.
    #[error("passphrase must be at least {min} characters")]
    WeakPassphrase { min: usize },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Local vault storage error.
    #[error("vault storage error: {0}")]
    Vault(#[from] StoreError),

    /// Internal cryptographic failure.
    #[error("crypto error: {0}")]
    Crypto(CryptoError),
}

/// Result type for drive operations.
pub type Result<T> = std::result::Result<T, DriveError>;

impl From<CryptoError> for DriveError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::Authentication => DriveError::Authentication,
            CryptoError::Integrity => DriveError::Integrity,
            CryptoError::Format(msg) => DriveError::Format(msg),
            CryptoError::KeyUnwrap => DriveError::KeyUnwrap,
            other => DriveError::Crypto(other),
        }
    }
}

impl From<LedgerError> for DriveError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Unavailable(msg) => DriveError::LedgerUnavailable(msg),
            LedgerError::Rejected(msg) => DriveError::LedgerRejected(msg),
        }
    }
}

impl From<CoreError> for DriveError {
    fn from(e: CoreError) -> Self {
        DriveError::Format(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_errors_keep_their_kind() {
        assert!(matches!(
            DriveError::from(CryptoError::Integrity),
            DriveError::Integrity
        ));
        assert!(matches!(
            DriveError::from(CryptoError::KeyUnwrap),
            DriveError::KeyUnwrap
        ));
        assert!(matches!(
            DriveError::from(CryptoError::Authentication),
            DriveError::Authentication
        ));
        assert!(matches!(
            DriveError::from(CryptoError::Format("x".into())),
            DriveError::Format(_)
        ));
        assert!(matches!(
            DriveError::from(CryptoError::InvalidPublicKey),
            DriveError::Crypto(CryptoError::InvalidPublicKey)
        ));
    }

    #[test]
    fn test_ledger_errors() {
        assert!(matches!(
            DriveError::from(LedgerError::Unavailable("down".into())),
            DriveError::LedgerUnavailable(_)
        ));
        assert!(matches!(
            DriveError::from(LedgerError::Rejected("no".into())),
            DriveError::LedgerRejected(_)
        ));
    }
}
