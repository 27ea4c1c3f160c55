//! Key wrapping.
//!
//! ## Overview
//!
//! A file key is wrapped for a recipient with static-static X25519: the
//! sender's secret and the recipient's public key agree on a shared secret,
//! which is run through a BLAKE3 KDF and used as an XChaCha20-Poly1305 key.
//! The recipient reverses this with their secret and the sender's public key.
//!
//! Because the agreement is static-static, unwrapping needs to know who the
//! sender was. Ledger grants therefore always record the sharer.
//!
//! ## Wire Layout
//!
//! ```text
//! ┌──────────────┬──────────────────────────────────┐
//! │ nonce (24 B) │ sealed file key (32 B) ‖ tag (16)│
//! └──────────────┴──────────────────────────────────┘
//! ```

use zeroize::Zeroizing;

use cipherdrive_core::{decode_hex, encode_hex, encode_prefixed_hex};

use crate::crypto::{FileKey, PublicKey, SecretKey, WrapNonce, KEY_LEN, TAG_LEN, WRAP_NONCE_LEN};
use crate::error::{CryptoError, Result};

/// Length of the sealed file key (key plus tag).
pub const SEALED_KEY_LEN: usize = KEY_LEN + TAG_LEN;

/// Length of a wrapped key on the wire.
pub const WRAPPED_KEY_LEN: usize = WRAP_NONCE_LEN + SEALED_KEY_LEN;

/// A file key sealed for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedKey {
    /// Nonce used for this wrap.
    pub nonce: WrapNonce,

    /// Sealed file key.
    pub sealed: [u8; SEALED_KEY_LEN],
}

impl WrappedKey {
    /// Serialize as `nonce ‖ sealed`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(WRAPPED_KEY_LEN);
        out.extend_from_slice(self.nonce.as_bytes());
        out.extend_from_slice(&self.sealed);
        out
    }

    /// Parse from `nonce ‖ sealed`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != WRAPPED_KEY_LEN {
            return Err(CryptoError::Format(format!(
                "wrapped key must be {} bytes, got {}",
                WRAPPED_KEY_LEN,
                bytes.len()
            )));
        }

        let (nonce, sealed) = bytes.split_at(WRAP_NONCE_LEN);
        let mut nonce_bytes = [0u8; WRAP_NONCE_LEN];
        nonce_bytes.copy_from_slice(nonce);
        let mut sealed_bytes = [0u8; SEALED_KEY_LEN];
        sealed_bytes.copy_from_slice(sealed);

        Ok(Self {
            nonce: WrapNonce::from_bytes(nonce_bytes),
            sealed: sealed_bytes,
        })
    }

    /// Bare lowercase hex, as written for the owner's own grant.
    pub fn to_hex(&self) -> String {
        encode_hex(&self.to_bytes())
    }

    /// `0x`-prefixed lowercase hex, as written for shares.
    pub fn to_prefixed_hex(&self) -> String {
        encode_prefixed_hex(&self.to_bytes())
    }

    /// Parse from hex in either convention.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = decode_hex(s).map_err(|e| CryptoError::Format(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

/// Wrap a file key for a recipient using a fresh random nonce.
pub fn wrap(
    file_key: &FileKey,
    sender_secret: &SecretKey,
    recipient_public: &PublicKey,
) -> Result<WrappedKey> {
    wrap_with_nonce(file_key, sender_secret, recipient_public, WrapNonce::generate())
}

/// Wrap a file key with a caller-supplied nonce.
///
/// Reusing a nonce for the same sender/recipient pair breaks confidentiality.
/// Outside of fixed test vectors, use [`wrap`].
pub fn wrap_with_nonce(
    file_key: &FileKey,
    sender_secret: &SecretKey,
    recipient_public: &PublicKey,
    nonce: WrapNonce,
) -> Result<WrappedKey> {
    let shared = sender_secret
        .diffie_hellman(recipient_public)
        .ok_or(CryptoError::InvalidPublicKey)?;
    let wrap_key = shared.derive_wrap_key();

    let sealed = wrap_key.seal(file_key.as_bytes(), &nonce)?;
    let sealed: [u8; SEALED_KEY_LEN] = sealed
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::Encryption("unexpected sealed key length".into()))?;

    Ok(WrappedKey { nonce, sealed })
}

/// Unwrap a file key sealed for us.
///
/// Any failure (wrong sender, wrong recipient, tampered bytes, degenerate
/// sender key) is reported as `KeyUnwrap`.
pub fn unwrap(
    wrapped: &WrappedKey,
    sender_public: &PublicKey,
    recipient_secret: &SecretKey,
) -> Result<FileKey> {
    let shared = recipient_secret
        .diffie_hellman(sender_public)
        .ok_or(CryptoError::KeyUnwrap)?;
    let wrap_key = shared.derive_wrap_key();

    let plaintext: Zeroizing<Vec<u8>> = wrap_key.open(&wrapped.sealed, &wrapped.nonce)?;
    let bytes: Zeroizing<[u8; KEY_LEN]> = Zeroizing::new(
        plaintext
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::KeyUnwrap)?,
    );

    Ok(FileKey::from_bytes(*bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_unwrap_between_parties() {
        let alice = SecretKey::generate();
        let bob = SecretKey::generate();
        let file_key = FileKey::generate();

        let wrapped = wrap(&file_key, &alice, &bob.public_key()).unwrap();
        let unwrapped = unwrap(&wrapped, &alice.public_key(), &bob).unwrap();

        assert_eq!(unwrapped.as_bytes(), file_key.as_bytes());
    }

    #[test]
    fn test_self_wrap() {
        let alice = SecretKey::generate();
        let file_key = FileKey::generate();

        let wrapped = wrap(&file_key, &alice, &alice.public_key()).unwrap();
        let unwrapped = unwrap(&wrapped, &alice.public_key(), &alice).unwrap();

        assert_eq!(unwrapped.as_bytes(), file_key.as_bytes());
    }

    #[test]
    fn test_wrong_recipient_fails() {
        let alice = SecretKey::generate();
        let bob = SecretKey::generate();
        let eve = SecretKey::generate();
        let file_key = FileKey::generate();

        let wrapped = wrap(&file_key, &alice, &bob.public_key()).unwrap();

        assert!(matches!(
            unwrap(&wrapped, &alice.public_key(), &eve),
            Err(CryptoError::KeyUnwrap)
        ));
    }

    #[test]
    fn test_wrong_sender_fails() {
        let alice = SecretKey::generate();
        let bob = SecretKey::generate();
        let mallory = SecretKey::generate();
        let file_key = FileKey::generate();

        let wrapped = wrap(&file_key, &alice, &bob.public_key()).unwrap();

        assert!(matches!(
            unwrap(&wrapped, &mallory.public_key(), &bob),
            Err(CryptoError::KeyUnwrap)
        ));
    }

    #[test]
    fn test_bit_flips_fail_unwrap() {
        let alice = SecretKey::generate();
        let bob = SecretKey::generate();
        let file_key = FileKey::generate();

        let bytes = wrap(&file_key, &alice, &bob.public_key())
            .unwrap()
            .to_bytes();

        for byte in 0..bytes.len() {
            for bit in 0..8 {
                let mut tampered = bytes.clone();
                tampered[byte] ^= 1 << bit;
                let wrapped = WrappedKey::from_bytes(&tampered).unwrap();
                assert!(
                    matches!(
                        unwrap(&wrapped, &alice.public_key(), &bob),
                        Err(CryptoError::KeyUnwrap)
                    ),
                    "flip of bit {bit} in byte {byte} went undetected"
                );
            }
        }
    }

    #[test]
    fn test_low_order_keys() {
        let alice = SecretKey::generate();
        let file_key = FileKey::generate();
        let zero = PublicKey::from_bytes([0u8; 32]);

        assert!(matches!(
            wrap(&file_key, &alice, &zero),
            Err(CryptoError::InvalidPublicKey)
        ));

        let wrapped = wrap(&file_key, &alice, &alice.public_key()).unwrap();
        assert!(matches!(
            unwrap(&wrapped, &zero, &alice),
            Err(CryptoError::KeyUnwrap)
        ));
    }

    #[test]
    fn test_hex_conventions() {
        let alice = SecretKey::generate();
        let file_key = FileKey::generate();
        let wrapped = wrap(&file_key, &alice, &alice.public_key()).unwrap();

        let bare = wrapped.to_hex();
        let prefixed = wrapped.to_prefixed_hex();

        assert_eq!(bare.len(), WRAPPED_KEY_LEN * 2);
        assert_eq!(prefixed, format!("0x{bare}"));
        assert_eq!(WrappedKey::from_hex(&bare).unwrap(), wrapped);
        assert_eq!(WrappedKey::from_hex(&prefixed).unwrap(), wrapped);
    }

    #[test]
    fn test_wrong_length_is_format_error() {
        assert!(matches!(
            WrappedKey::from_bytes(&[0u8; WRAPPED_KEY_LEN - 1]),
            Err(CryptoError::Format(_))
        ));
        assert!(matches!(
            WrappedKey::from_hex("0xnothex"),
            Err(CryptoError::Format(_))
        ));
    }

    #[test]
    fn test_fixed_nonce_is_deterministic() {
        let alice = SecretKey::from_bytes([1u8; 32]);
        let bob = SecretKey::from_bytes([2u8; 32]);
        let file_key = FileKey::from_bytes([3u8; 32]);
        let nonce = WrapNonce::from_bytes([4u8; 24]);

        let a = wrap_with_nonce(&file_key, &alice, &bob.public_key(), nonce).unwrap();
        let b = wrap_with_nonce(&file_key, &alice, &bob.public_key(), nonce).unwrap();
        assert_eq!(a, b);

        // Agreement is symmetric, so bob wrapping for alice yields the same bytes.
        let c = wrap_with_nonce(&file_key, &bob, &alice.public_key(), nonce).unwrap();
        assert_eq!(a, c);
    }
}
