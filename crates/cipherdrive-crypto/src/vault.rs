//! Passphrase-sealed secret keys.
//!
//! ## Overview
//!
//! The vault record protects an identity secret at rest. A protection key is
//! stretched from the passphrase with Argon2id and a random salt, then used
//! to seal the 32-byte secret with ChaCha20-Poly1305.
//!
//! The record is CBOR and carries its own KDF parameters, so the cost can be
//! raised for new vaults without breaking old ones.
//!
//! Every failure to open a record (wrong passphrase, truncated bytes, unknown
//! version, absurd parameters) is reported as `Authentication`.

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::{SecretKey, BLOB_NONCE_LEN, KEY_LEN};
use crate::error::{CryptoError, Result};

/// Current record version.
pub const VAULT_VERSION: u8 = 1;

/// Salt length.
pub const SALT_LEN: usize = 16;

/// Largest memory cost accepted when opening a record (1 GiB).
pub const MAX_MEMORY_KIB: u32 = 1024 * 1024;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,

    /// Number of passes.
    pub iterations: u32,

    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    /// Minimal-cost parameters. Only for tests.
    pub fn insecure_fast() -> Self {
        Self {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn is_reasonable(&self) -> bool {
        self.memory_kib <= MAX_MEMORY_KIB
            && self.iterations >= 1
            && self.iterations <= 64
            && self.parallelism >= 1
            && self.parallelism <= 16
    }

    fn to_argon2(self) -> Result<Argon2<'static>> {
        let params = Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(KEY_LEN),
        )
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Serialized vault record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VaultRecord {
    version: u8,
    kdf: KdfParams,
    salt: [u8; SALT_LEN],
    nonce: [u8; BLOB_NONCE_LEN],
    ciphertext: Vec<u8>,
}

impl VaultRecord {
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| CryptoError::Format(format!("vault record encoding: {e}")))?;
        Ok(buf)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|_| CryptoError::Authentication)
    }
}

fn derive_protection_key(
    passphrase: &str,
    salt: &[u8; SALT_LEN],
    params: KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    params
        .to_argon2()?
        .hash_password_into(passphrase.as_bytes(), salt, &mut key[..])
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

/// Seal a secret key under a passphrase.
///
/// Uses a fresh salt and nonce, so sealing the same secret twice yields
/// unrelated records.
pub fn seal(secret: &SecretKey, passphrase: &str, params: KdfParams) -> Result<Vec<u8>> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; BLOB_NONCE_LEN];
    let mut rng = rand::thread_rng();
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut nonce);

    let key = derive_protection_key(passphrase, &salt, params)?;
    let cipher = ChaCha20Poly1305::new_from_slice(&key[..])
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let secret_bytes = secret.to_bytes();
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), &secret_bytes[..])
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    VaultRecord {
        version: VAULT_VERSION,
        kdf: params,
        salt,
        nonce,
        ciphertext,
    }
    .to_bytes()
}

/// Open a sealed record with a passphrase.
pub fn open(record: &[u8], passphrase: &str) -> Result<SecretKey> {
    let record = VaultRecord::from_bytes(record)?;
    if record.version != VAULT_VERSION || !record.kdf.is_reasonable() {
        return Err(CryptoError::Authentication);
    }

    let key = derive_protection_key(passphrase, &record.salt, record.kdf)
        .map_err(|_| CryptoError::Authentication)?;
    let cipher =
        ChaCha20Poly1305::new_from_slice(&key[..]).map_err(|_| CryptoError::Authentication)?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&record.nonce), record.ciphertext.as_slice())
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::Authentication)?;

    let bytes: Zeroizing<[u8; KEY_LEN]> = Zeroizing::new(
        plaintext
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::Authentication)?,
    );

    Ok(SecretKey::from_bytes(*bytes))
}

/// KDF parameters recorded in a sealed record, if it parses.
pub fn record_params(record: &[u8]) -> Option<KdfParams> {
    VaultRecord::from_bytes(record).ok().map(|r| r.kdf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> KdfParams {
        KdfParams::insecure_fast()
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let secret = SecretKey::generate();
        let record = seal(&secret, "correct horse battery staple", fast()).unwrap();

        let opened = open(&record, "correct horse battery staple").unwrap();
        assert_eq!(opened.public_key(), secret.public_key());
    }

    #[test]
    fn test_wrong_passphrase_is_authentication_error() {
        let secret = SecretKey::generate();
        let record = seal(&secret, "right passphrase", fast()).unwrap();

        assert!(matches!(
            open(&record, "wrong passphrase"),
            Err(CryptoError::Authentication)
        ));
    }

    #[test]
    fn test_garbage_is_authentication_error() {
        assert!(matches!(
            open(b"not a vault", "whatever"),
            Err(CryptoError::Authentication)
        ));
        assert!(matches!(open(&[], "whatever"), Err(CryptoError::Authentication)));
    }

    #[test]
    fn test_truncated_record_is_authentication_error() {
        let secret = SecretKey::generate();
        let record = seal(&secret, "passphrase", fast()).unwrap();

        assert!(matches!(
            open(&record[..record.len() - 1], "passphrase"),
            Err(CryptoError::Authentication)
        ));
    }

    #[test]
    fn test_records_are_salted() {
        let secret = SecretKey::generate();
        let a = seal(&secret, "same", fast()).unwrap();
        let b = seal(&secret, "same", fast()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_params_are_recorded() {
        let secret = SecretKey::generate();
        let params = KdfParams {
            memory_kib: 128,
            iterations: 2,
            parallelism: 1,
        };
        let record = seal(&secret, "pw", params).unwrap();

        assert_eq!(record_params(&record), Some(params));
        assert!(open(&record, "pw").is_ok());
    }

    #[test]
    fn test_unreasonable_params_rejected() {
        let record = VaultRecord {
            version: VAULT_VERSION,
            kdf: KdfParams {
                memory_kib: u32::MAX,
                iterations: 1,
                parallelism: 1,
            },
            salt: [0u8; SALT_LEN],
            nonce: [0u8; BLOB_NONCE_LEN],
            ciphertext: vec![0u8; KEY_LEN + 16],
        }
        .to_bytes()
        .unwrap();

        assert!(matches!(open(&record, "pw"), Err(CryptoError::Authentication)));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let secret = SecretKey::generate();
        let record = seal(&secret, "pw", fast()).unwrap();
        let mut parsed = VaultRecord::from_bytes(&record).unwrap();
        parsed.version = 99;

        assert!(matches!(
            open(&parsed.to_bytes().unwrap(), "pw"),
            Err(CryptoError::Authentication)
        ));
    }

    #[test]
    fn test_default_params() {
        let params = KdfParams::default();
        assert!(params.is_reasonable());
        assert!(params.memory_kib >= 19 * 1024);
    }
}
