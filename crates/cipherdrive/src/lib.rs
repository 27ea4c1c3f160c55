//! # cipherdrive
//!
//! Owner-controlled encrypted file storage on a public content-addressed
//! store, with access recorded on a public ledger.
//!
//! ## Overview
//!
//! Every file is encrypted on the client under its own key before upload.
//! The file key is wrapped for each party allowed to read it, and only the
//! wrapped keys are written to the ledger:
//!
//! - **Upload** records a self-grant so the owner can read their own file
//! - **Share** re-wraps the file key for a recipient's published public key
//! - **Revoke** removes a recipient's grant from the ledger
//! - **View** unwraps whichever grant the account holds and decrypts
//!
//! Each account's X25519 secret key is sealed under a passphrase in a local
//! vault and unlocked into a [`Session`] at login.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cipherdrive::{Drive, DriveConfig};
//! use cipherdrive::core::AccountId;
//! use cipherdrive::store::{MemoryBlobStore, MemoryLedger, SqliteVaultStore};
//!
//! async fn example() {
//!     let drive = Drive::new(
//!         MemoryLedger::new(),
//!         MemoryBlobStore::new(),
//!         SqliteVaultStore::open("vaults.db").unwrap(),
//!         DriveConfig::default(),
//!     );
//!
//!     let alice = AccountId::new("0xA11CE").unwrap();
//!     let bob = AccountId::new("0xB0B").unwrap();
//!
//!     let mut session = drive.login(&alice, "correct horse battery").await.unwrap();
//!     let file = drive
//!         .upload(&mut session, "notes.txt", "text/plain", b"hello")
//!         .await
//!         .unwrap();
//!
//!     drive.share(&session, &file.file_id, &bob).await.unwrap();
//!     let bytes = drive.view(&session, &file.file_id).await.unwrap();
//!     assert_eq!(bytes, b"hello");
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `cipherdrive::core` - Identifiers and file metadata
//! - `cipherdrive::crypto` - Envelope encryption, key wrapping, vault
//! - `cipherdrive::store` - Ledger, blob store and vault adapters

pub mod config;
pub mod drive;
pub mod error;
pub mod keyvault;
pub mod session;

pub use cipherdrive_core as core;
pub use cipherdrive_crypto as crypto;
pub use cipherdrive_store as store;

pub use config::DriveConfig;
pub use drive::Drive;
pub use error::{DriveError, Result};
pub use keyvault::KeyVault;
pub use session::{SearchResults, Session};

pub use cipherdrive_core::{AccountId, ContentId, FileCategory, FileMetadata, SharedFile};
