//! # cipherdrive Crypto
//!
//! Envelope encryption for stored files and the key material around it.
//!
//! ## Overview
//!
//! Files are encrypted client-side before they reach any blob store. The
//! scheme has three layers:
//!
//! 1. **File key**: a fresh ChaCha20-Poly1305 key per file seals the bytes
//! 2. **Wrapped key**: the file key is wrapped for each reader with X25519
//!    key agreement between the sharer and the reader
//! 3. **Vault**: each account's X25519 secret is sealed under an Argon2id
//!    passphrase key for storage at rest
//!
//! Only wrapped keys and public keys ever leave the client.
//!
//! ## Usage
//!
//! ```rust
//! use cipherdrive_crypto::{decrypt_file, encrypt_file, unwrap, wrap, KeyPair};
//!
//! let alice = KeyPair::generate();
//! let bob = KeyPair::generate();
//!
//! let sealed = encrypt_file(b"hello").unwrap();
//! let grant = wrap(&sealed.file_key, alice.secret(), &bob.public()).unwrap();
//!
//! let file_key = unwrap(&grant, &alice.public(), bob.secret()).unwrap();
//! assert_eq!(decrypt_file(&file_key, &sealed.to_blob()).unwrap(), b"hello");
//! ```

pub mod crypto;
pub mod envelope;
pub mod error;
pub mod identity;
pub mod vault;
pub mod wrap;

pub use crypto::{
    BlobNonce, FileKey, PublicKey, SecretKey, SharedKey, WrapNonce, BLOB_NONCE_LEN, KEY_LEN,
    TAG_LEN, WRAP_NONCE_LEN,
};
pub use envelope::{decrypt_file, encrypt_file, split_blob, SealedFile};
pub use error::{CryptoError, Result};
pub use identity::{derive_public_key, KeyPair};
pub use vault::KdfParams;
pub use wrap::{unwrap, wrap, wrap_with_nonce, WrappedKey, SEALED_KEY_LEN, WRAPPED_KEY_LEN};
