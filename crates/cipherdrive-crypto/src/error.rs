//! Error types for the crypto crate.

use thiserror::Error;

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Vault unlock failed: wrong passphrase or corrupt record.
    #[error("authentication failed: wrong passphrase or corrupt vault record")]
    Authentication,

    /// Blob ciphertext failed its authentication tag.
    #[error("integrity check failed: blob was tampered with or the key is wrong")]
    Integrity,

    /// Input is structurally malformed.
    #[error("malformed input: {0}")]
    Format(String),

    /// Wrapped key failed authentication.
    #[error("key unwrap failed: wrong key pair or corrupted grant")]
    KeyUnwrap,

    /// Public key is a low-order point and cannot be used for key agreement.
    #[error("invalid public key")]
    InvalidPublicKey,

    /// Passphrase key derivation failed.
    #[error("key derivation error: {0}")]
    KeyDerivation(String),

    /// Encryption failed inside the primitive.
    #[error("encryption error: {0}")]
    Encryption(String),
}

/// Result type for crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
