//! Key and nonce types.
//!
//! Provides X25519 key agreement, the per-file ChaCha20-Poly1305 key, and the
//! XChaCha20-Poly1305 key used to wrap file keys.

use std::fmt;

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce, XChaCha20Poly1305, XNonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey as DalekPublicKey, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use cipherdrive_core::{decode_hex, encode_hex};

use crate::error::{CryptoError, Result};

/// Symmetric key length (256 bits).
pub const KEY_LEN: usize = 32;

/// Blob nonce length (96 bits).
pub const BLOB_NONCE_LEN: usize = 12;

/// Wrap nonce length (192 bits, XChaCha20).
pub const WRAP_NONCE_LEN: usize = 24;

/// Poly1305 tag length.
pub const TAG_LEN: usize = 16;

const WRAP_KEY_CONTEXT: &str = "cipherdrive 2024-06 file-key wrap v1";

/// An X25519 public key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, no prefix. This is the ledger representation.
    pub fn to_hex(&self) -> String {
        encode_hex(&self.0)
    }

    /// Parse from hex, tolerating a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = decode_hex(s).map_err(|e| CryptoError::Format(e.to_string()))?;
        let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            CryptoError::Format(format!(
                "public key must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    fn to_dalek(self) -> DalekPublicKey {
        DalekPublicKey::from(self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

impl From<DalekPublicKey> for PublicKey {
    fn from(pk: DalekPublicKey) -> Self {
        Self(*pk.as_bytes())
    }
}

/// An X25519 static secret key.
///
/// Zeroized on drop. Never serialized; the only way out of memory is through
/// the passphrase vault.
pub struct SecretKey(StaticSecret);

impl SecretKey {
    /// Generate a new random secret.
    pub fn generate() -> Self {
        Self(StaticSecret::random_from_rng(rand::thread_rng()))
    }

    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(StaticSecret::from(bytes))
    }

    /// Copy the raw bytes out into a zeroizing buffer.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.0.to_bytes())
    }

    /// Derive the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from(DalekPublicKey::from(&self.0))
    }

    /// Perform key agreement with a peer's public key.
    ///
    /// Returns `None` when the peer key is a low-order point, since the
    /// resulting shared secret would be predictable.
    pub fn diffie_hellman(&self, peer_public: &PublicKey) -> Option<SharedKey> {
        let shared = self.0.diffie_hellman(&peer_public.to_dalek());
        if !shared.was_contributory() {
            return None;
        }
        Some(SharedKey(Zeroizing::new(*shared.as_bytes())))
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// A shared secret derived from X25519 key agreement.
pub struct SharedKey(Zeroizing<[u8; 32]>);

impl SharedKey {
    /// Derive the key-wrapping key from this shared secret.
    pub(crate) fn derive_wrap_key(&self) -> WrapKey {
        let mut hasher = blake3::Hasher::new_derive_key(WRAP_KEY_CONTEXT);
        hasher.update(&self.0[..]);
        WrapKey(Zeroizing::new(*hasher.finalize().as_bytes()))
    }
}

/// A 256-bit per-file symmetric key.
///
/// Not `Clone`. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct FileKey([u8; KEY_LEN]);

impl FileKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Encrypt data under this key.
    pub fn encrypt(&self, plaintext: &[u8], nonce: &BlobNonce) -> Result<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        cipher
            .encrypt(Nonce::from_slice(&nonce.0), plaintext)
            .map_err(|e| CryptoError::Encryption(e.to_string()))
    }

    /// Decrypt and verify data under this key.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &BlobNonce) -> Result<Vec<u8>> {
        let cipher =
            ChaCha20Poly1305::new_from_slice(&self.0).map_err(|_| CryptoError::Integrity)?;

        cipher
            .decrypt(Nonce::from_slice(&nonce.0), ciphertext)
            .map_err(|_| CryptoError::Integrity)
    }
}

impl fmt::Debug for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FileKey(..)")
    }
}

/// Symmetric key derived from an X25519 shared secret, used only to seal and
/// open file keys.
pub(crate) struct WrapKey(Zeroizing<[u8; 32]>);

impl WrapKey {
    pub(crate) fn seal(&self, plaintext: &[u8], nonce: &WrapNonce) -> Result<Vec<u8>> {
        let cipher = XChaCha20Poly1305::new_from_slice(&self.0[..])
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        cipher
            .encrypt(XNonce::from_slice(&nonce.0), plaintext)
            .map_err(|e| CryptoError::Encryption(e.to_string()))
    }

    pub(crate) fn open(&self, sealed: &[u8], nonce: &WrapNonce) -> Result<Zeroizing<Vec<u8>>> {
        let cipher =
            XChaCha20Poly1305::new_from_slice(&self.0[..]).map_err(|_| CryptoError::KeyUnwrap)?;

        cipher
            .decrypt(XNonce::from_slice(&nonce.0), sealed)
            .map(Zeroizing::new)
            .map_err(|_| CryptoError::KeyUnwrap)
    }
}

/// A 96-bit nonce for blob encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobNonce(pub [u8; BLOB_NONCE_LEN]);

impl BlobNonce {
    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; BLOB_NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; BLOB_NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; BLOB_NONCE_LEN] {
        &self.0
    }
}

/// A 192-bit nonce for key wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapNonce(pub [u8; WRAP_NONCE_LEN]);

impl WrapNonce {
    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; WRAP_NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; WRAP_NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; WRAP_NONCE_LEN] {
        &self.0
    }
}
