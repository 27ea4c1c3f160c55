//! Known-answer vectors for the identity and blob formats.
//!
//! Identity vectors pin X25519 public key derivation (the first two are from
//! RFC 7748 section 6.1). Blob vectors pin the stored layout
//! `nonce ‖ ciphertext ‖ tag` under ChaCha20-Poly1305 with fixed key and
//! nonce. Wrapped keys are random by construction, so they get structural
//! checks only.

use cipherdrive_crypto::{
    decrypt_file, derive_public_key, wrap_with_nonce, BlobNonce, FileKey, SecretKey, WrapNonce,
    WrappedKey,
};

/// Secret key to public key.
#[derive(Debug, Clone)]
pub struct IdentityVector {
    pub name: &'static str,
    pub secret_hex: &'static str,
    pub public_hex: &'static str,
}

/// Fixed-key, fixed-nonce file encryption.
#[derive(Debug, Clone)]
pub struct BlobVector {
    pub name: &'static str,
    pub key: [u8; 32],
    pub nonce: [u8; 12],
    pub plaintext: &'static [u8],
    pub blob_hex: &'static str,
}

/// Inputs for a deterministic wrap.
#[derive(Debug, Clone)]
pub struct WrapVector {
    pub name: &'static str,
    pub sender_secret: [u8; 32],
    pub recipient_secret: [u8; 32],
    pub file_key: [u8; 32],
    pub nonce: [u8; 24],
}

/// All identity vectors.
pub fn identity_vectors() -> Vec<IdentityVector> {
    vec![
        IdentityVector {
            name: "RFC 7748 alice",
            secret_hex: "77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a",
            public_hex: "8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a",
        },
        IdentityVector {
            name: "RFC 7748 bob",
            secret_hex: "5dab087e624a8a4b79e17f8b83800ee66f3bb1292618b6fd1c2f8b27ff88e0eb",
            public_hex: "de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f",
        },
        IdentityVector {
            name: "repeated 0x11",
            secret_hex: "1111111111111111111111111111111111111111111111111111111111111111",
            public_hex: "7b4e909bbe7ffe44c465a220037d608ee35897d31ef972f07f74892cb0f73f13",
        },
        IdentityVector {
            name: "repeated 0x22",
            secret_hex: "2222222222222222222222222222222222222222222222222222222222222222",
            public_hex: "0faa684ed28867b97f4a6a2dee5df8ce974e76b7018e3f22a1c4cf2678570f20",
        },
    ]
}

/// All blob vectors.
pub fn blob_vectors() -> Vec<BlobVector> {
    vec![
        BlobVector {
            name: "helloworld",
            key: [0x01; 32],
            nonce: [0x02; 12],
            plaintext: b"helloworld",
            blob_hex: "0202020202020202020202028e799e42e2d487a81d49561957325f5db02451d2857cd2e44dc0",
        },
        BlobVector {
            name: "empty file",
            key: [0x01; 32],
            nonce: [0x02; 12],
            plaintext: b"",
            blob_hex: "0202020202020202020202024ebab2606660ea136cf45bee10bbcd8b",
        },
    ]
}

/// All wrap vectors.
pub fn wrap_vectors() -> Vec<WrapVector> {
    vec![
        WrapVector {
            name: "distinct parties",
            sender_secret: [0x11; 32],
            recipient_secret: [0x22; 32],
            file_key: [0x33; 32],
            nonce: [0x44; 24],
        },
        WrapVector {
            name: "self-grant",
            sender_secret: [0x11; 32],
            recipient_secret: [0x11; 32],
            file_key: [0x55; 32],
            nonce: [0x00; 24],
        },
    ]
}

/// Check that a secret derives the expected public key.
pub fn check_identity_vector(v: &IdentityVector) -> bool {
    let Ok(bytes) = hex::decode(v.secret_hex) else {
        return false;
    };
    let Ok(secret) = <[u8; 32]>::try_from(bytes.as_slice()) else {
        return false;
    };
    derive_public_key(&SecretKey::from_bytes(secret)).to_hex() == v.public_hex
}

/// Check that encryption and decryption both match the vector.
pub fn check_blob_vector(v: &BlobVector) -> bool {
    let key = FileKey::from_bytes(v.key);
    let Ok(ciphertext) = key.encrypt(v.plaintext, &BlobNonce::from_bytes(v.nonce)) else {
        return false;
    };

    let mut blob = v.nonce.to_vec();
    blob.extend_from_slice(&ciphertext);

    hex::encode(&blob) == v.blob_hex
        && decrypt_file(&key, &blob).map(|p| p == v.plaintext).unwrap_or(false)
}

/// Wrap a vector's file key deterministically.
pub fn wrap_from_vector(v: &WrapVector) -> Option<WrappedKey> {
    let sender = SecretKey::from_bytes(v.sender_secret);
    let recipient = SecretKey::from_bytes(v.recipient_secret).public_key();
    wrap_with_nonce(
        &FileKey::from_bytes(v.file_key),
        &sender,
        &recipient,
        WrapNonce::from_bytes(v.nonce),
    )
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cipherdrive_crypto::{unwrap, WRAPPED_KEY_LEN};

    #[test]
    fn test_identity_vectors() {
        for v in identity_vectors() {
            assert!(check_identity_vector(&v), "identity vector '{}' failed", v.name);
        }
    }

    #[test]
    fn test_blob_vectors() {
        for v in blob_vectors() {
            assert!(check_blob_vector(&v), "blob vector '{}' failed", v.name);
        }
    }

    #[test]
    fn test_wrap_vectors_are_structurally_sound() {
        for v in wrap_vectors() {
            let wrapped = wrap_from_vector(&v).unwrap();
            let bytes = wrapped.to_bytes();

            assert_eq!(bytes.len(), WRAPPED_KEY_LEN, "{}", v.name);
            assert_eq!(&bytes[..24], &v.nonce, "{}", v.name);
            assert_eq!(wrapped.to_hex().len(), 144, "{}", v.name);
            assert_eq!(wrapped.to_prefixed_hex().len(), 146, "{}", v.name);
            assert!(!wrapped.to_hex().starts_with("0x"));
            assert!(wrapped.to_prefixed_hex().starts_with("0x"));

            // The sealed key never equals the plaintext key.
            assert_ne!(&bytes[24..56], &v.file_key, "{}", v.name);
        }
    }

    #[test]
    fn test_wrap_vectors_are_deterministic_and_open() {
        for v in wrap_vectors() {
            let a = wrap_from_vector(&v).unwrap();
            let b = wrap_from_vector(&v).unwrap();
            assert_eq!(a, b, "{}", v.name);

            let sender_public = SecretKey::from_bytes(v.sender_secret).public_key();
            let recipient = SecretKey::from_bytes(v.recipient_secret);
            let key = unwrap(&a, &sender_public, &recipient).unwrap();
            assert_eq!(key.as_bytes(), &v.file_key, "{}", v.name);
        }
    }
}
