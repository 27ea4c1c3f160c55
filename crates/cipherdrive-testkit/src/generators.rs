//! Proptest generators for property-based testing.

use proptest::prelude::*;

use cipherdrive_core::AccountId;
use cipherdrive_crypto::{FileKey, KeyPair, SecretKey, WrapNonce};

/// Generate a secret key from random bytes.
pub fn secret_key() -> impl Strategy<Value = SecretKey> {
    any::<[u8; 32]>().prop_map(SecretKey::from_bytes)
}

/// Generate a key pair.
pub fn key_pair() -> impl Strategy<Value = KeyPair> {
    secret_key().prop_map(KeyPair::from_secret)
}

/// Generate a file key.
pub fn file_key() -> impl Strategy<Value = FileKey> {
    any::<[u8; 32]>().prop_map(FileKey::from_bytes)
}

/// Generate a wrap nonce.
pub fn wrap_nonce() -> impl Strategy<Value = WrapNonce> {
    any::<[u8; 24]>().prop_map(WrapNonce::from_bytes)
}

/// Generate file contents of at most `max_len` bytes.
pub fn plaintext(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a file name.
pub fn file_name() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 _-]{1,24}\\.(txt|pdf|png|zip|bin)".prop_map(String::from)
}

/// Generate a MIME type.
pub fn mime_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("text/plain".to_string()),
        Just("application/pdf".to_string()),
        Just("image/png".to_string()),
        Just("application/zip".to_string()),
        Just("application/octet-stream".to_string()),
        "[a-z]{1,10}/[a-z0-9.+-]{1,16}".prop_map(String::from),
    ]
}

/// Generate an account address with mixed letter case.
pub fn account_id() -> impl Strategy<Value = AccountId> {
    "0x[0-9a-fA-F]{40}".prop_map(|s| AccountId::new(s).expect("non-empty address"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cipherdrive_core::FileCategory;
    use cipherdrive_crypto::{
        decrypt_file, encrypt_file, unwrap, wrap, wrap_with_nonce, CryptoError, WrappedKey,
    };

    proptest! {
        #[test]
        fn test_envelope_roundtrip(data in plaintext(4096)) {
            let sealed = encrypt_file(&data).unwrap();
            let blob = sealed.to_blob();
            prop_assert_eq!(decrypt_file(&sealed.file_key, &blob).unwrap(), data);
        }

        #[test]
        fn test_envelope_detects_flip(data in plaintext(256), pos in any::<prop::sample::Index>(), bit in 0u8..8) {
            let sealed = encrypt_file(&data).unwrap();
            let mut blob = sealed.to_blob();
            let i = pos.index(blob.len());
            blob[i] ^= 1 << bit;
            prop_assert!(matches!(
                decrypt_file(&sealed.file_key, &blob),
                Err(CryptoError::Integrity)
            ));
        }

        #[test]
        fn test_wrap_roundtrip(sender in key_pair(), recipient in key_pair(), key in file_key()) {
            let wrapped = wrap(&key, sender.secret(), &recipient.public()).unwrap();
            let opened = unwrap(&wrapped, &sender.public(), recipient.secret()).unwrap();
            prop_assert_eq!(opened.as_bytes(), key.as_bytes());
        }

        #[test]
        fn test_wrap_detects_flip(
            sender in key_pair(),
            recipient in key_pair(),
            key in file_key(),
            pos in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let mut bytes = wrap(&key, sender.secret(), &recipient.public()).unwrap().to_bytes();
            let i = pos.index(bytes.len());
            bytes[i] ^= 1 << bit;
            let tampered = WrappedKey::from_bytes(&bytes).unwrap();
            prop_assert!(matches!(
                unwrap(&tampered, &sender.public(), recipient.secret()),
                Err(CryptoError::KeyUnwrap)
            ));
        }

        #[test]
        fn test_wrapped_key_hex_forms(sender in key_pair(), key in file_key(), nonce in wrap_nonce()) {
            let wrapped = wrap_with_nonce(&key, sender.secret(), &sender.public(), nonce).unwrap();
            prop_assert_eq!(&WrappedKey::from_hex(&wrapped.to_hex()).unwrap(), &wrapped);
            prop_assert_eq!(&WrappedKey::from_hex(&wrapped.to_prefixed_hex()).unwrap(), &wrapped);
            prop_assert_eq!(
                &WrappedKey::from_hex(&wrapped.to_prefixed_hex().to_uppercase()).unwrap(),
                &wrapped
            );
        }

        #[test]
        fn test_account_ids_normalize(id in account_id()) {
            let upper = AccountId::new(id.as_str().to_uppercase()).unwrap();
            prop_assert_eq!(upper, id);
        }

        #[test]
        fn test_category_is_total(mime in mime_type()) {
            let category = FileCategory::from_mime(&mime);
            prop_assert!(!category.label().is_empty());
        }
    }
}
