//! File envelope encryption.
//!
//! ## Overview
//!
//! Every file is sealed under a fresh random [`FileKey`] and nonce. The
//! stored blob is self-describing apart from the key:
//!
//! ```text
//! ┌──────────────┬───────────────────────────────┐
//! │ nonce (12 B) │ ciphertext ‖ Poly1305 tag     │
//! └──────────────┴───────────────────────────────┘
//! ```
//!
//! The file key never touches the blob store. It leaves this module only to
//! be wrapped for a recipient.

use crate::crypto::{BlobNonce, FileKey, BLOB_NONCE_LEN, TAG_LEN};
use crate::error::{CryptoError, Result};

/// Output of [`encrypt_file`].
#[derive(Debug)]
pub struct SealedFile {
    /// The fresh key the file was sealed under.
    pub file_key: FileKey,

    /// The nonce used for this file.
    pub nonce: BlobNonce,

    /// Ciphertext with the authentication tag appended.
    pub ciphertext: Vec<u8>,
}

impl SealedFile {
    /// Serialize to the stored blob layout: `nonce ‖ ciphertext`.
    pub fn to_blob(&self) -> Vec<u8> {
        let mut blob = Vec::with_capacity(BLOB_NONCE_LEN + self.ciphertext.len());
        blob.extend_from_slice(self.nonce.as_bytes());
        blob.extend_from_slice(&self.ciphertext);
        blob
    }

    /// Size of the stored blob.
    pub fn blob_len(&self) -> usize {
        BLOB_NONCE_LEN + self.ciphertext.len()
    }

    /// Split into the key and the stored blob.
    pub fn into_parts(self) -> (FileKey, Vec<u8>) {
        let blob = self.to_blob();
        (self.file_key, blob)
    }
}

/// Encrypt a file under a freshly generated key and nonce.
///
/// Two calls with identical input produce unrelated keys and blobs.
pub fn encrypt_file(plaintext: &[u8]) -> Result<SealedFile> {
    let file_key = FileKey::generate();
    let nonce = BlobNonce::generate();
    let ciphertext = file_key.encrypt(plaintext, &nonce)?;

    Ok(SealedFile {
        file_key,
        nonce,
        ciphertext,
    })
}

/// Split a stored blob into its nonce and ciphertext.
pub fn split_blob(blob: &[u8]) -> Result<(BlobNonce, &[u8])> {
    if blob.len() < BLOB_NONCE_LEN {
        return Err(CryptoError::Format(format!(
            "blob too short: {} bytes, need at least {}",
            blob.len(),
            BLOB_NONCE_LEN
        )));
    }

    let (nonce, ciphertext) = blob.split_at(BLOB_NONCE_LEN);
    let mut bytes = [0u8; BLOB_NONCE_LEN];
    bytes.copy_from_slice(nonce);
    Ok((BlobNonce::from_bytes(bytes), ciphertext))
}

/// Decrypt a stored blob with its file key.
///
/// Fails with `Format` if the blob cannot hold a nonce and `Integrity` if
/// the tag does not verify (including blobs with no room for a tag).
pub fn decrypt_file(file_key: &FileKey, blob: &[u8]) -> Result<Vec<u8>> {
    let (nonce, ciphertext) = split_blob(blob)?;
    if ciphertext.len() < TAG_LEN {
        return Err(CryptoError::Integrity);
    }
    file_key.decrypt(ciphertext, &nonce)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let plaintext = b"the quick brown fox";
        let sealed = encrypt_file(plaintext).unwrap();
        let blob = sealed.to_blob();

        assert_eq!(blob.len(), sealed.blob_len());
        assert_eq!(blob.len(), BLOB_NONCE_LEN + plaintext.len() + TAG_LEN);
        assert_eq!(&blob[..BLOB_NONCE_LEN], sealed.nonce.as_bytes());

        let decrypted = decrypt_file(&sealed.file_key, &blob).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_empty_file() {
        let sealed = encrypt_file(b"").unwrap();
        let (key, blob) = sealed.into_parts();

        assert_eq!(blob.len(), BLOB_NONCE_LEN + TAG_LEN);
        assert!(decrypt_file(&key, &blob).unwrap().is_empty());
    }

    #[test]
    fn test_fresh_key_and_nonce_per_call() {
        let a = encrypt_file(b"same input").unwrap();
        let b = encrypt_file(b"same input").unwrap();

        assert_ne!(a.file_key.as_bytes(), b.file_key.as_bytes());
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_every_bit_flip_is_detected() {
        let sealed = encrypt_file(b"tamper me").unwrap();
        let blob = sealed.to_blob();

        for byte in 0..blob.len() {
            for bit in 0..8 {
                let mut tampered = blob.clone();
                tampered[byte] ^= 1 << bit;
                assert!(
                    matches!(
                        decrypt_file(&sealed.file_key, &tampered),
                        Err(CryptoError::Integrity)
                    ),
                    "flip at byte {byte} bit {bit} went undetected"
                );
            }
        }
    }

    #[test]
    fn test_short_blob_is_format_error() {
        let key = FileKey::generate();
        assert!(matches!(
            decrypt_file(&key, &[0u8; 11]),
            Err(CryptoError::Format(_))
        ));
        assert!(matches!(
            decrypt_file(&key, &[0u8; 12]),
            Err(CryptoError::Integrity)
        ));
    }

    #[test]
    fn test_wrong_key_is_integrity_error() {
        let sealed = encrypt_file(b"data").unwrap();
        let other = FileKey::generate();

        assert!(matches!(
            decrypt_file(&other, &sealed.to_blob()),
            Err(CryptoError::Integrity)
        ));
    }
}
