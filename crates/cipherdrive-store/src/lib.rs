//! # cipherdrive Store
//!
//! Adapter traits for the systems cipherdrive talks to, with reference
//! implementations.
//!
//! ## Overview
//!
//! cipherdrive never stores plaintext or key material outside the client.
//! What it does store lives in three places:
//!
//! - A public **ledger** holding public keys, file metadata and wrapped keys
//! - A content-addressed **blob store** holding encrypted file blobs
//! - A local **vault store** holding each account's passphrase-sealed secret
//!
//! ## Key Types
//!
//! - [`Ledger`] - Async trait for the access-control ledger
//! - [`BlobStore`] - Async trait for the content-addressed store
//! - [`VaultStore`] - Async trait for local vault persistence
//! - [`MemoryLedger`], [`MemoryBlobStore`], [`MemoryVaultStore`] - In-memory adapters
//! - [`SqliteVaultStore`] - SQLite-backed vault persistence
//! - [`BlobMirrors`] - Primary plus mirrors with verified first-success reads
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cipherdrive_store::{SqliteVaultStore, VaultStore};
//! use cipherdrive_core::AccountId;
//!
//! async fn example() {
//!     let vaults = SqliteVaultStore::open("vaults.db").unwrap();
//!     let account = AccountId::new("0xabc").unwrap();
//!     let exists = vaults.has_vault(&account).await.unwrap();
//! }
//! ```

pub mod error;
pub mod memory;
pub mod migration;
pub mod mirrors;
pub mod sqlite;
pub mod traits;

pub use error::{BlobError, BlobResult, LedgerError, LedgerResult, Result, StoreError};
pub use memory::{content_id_for, MemoryBlobStore, MemoryLedger, MemoryVaultStore};
pub use mirrors::BlobMirrors;
pub use sqlite::SqliteVaultStore;
pub use traits::{BlobStore, Ledger, NewFile, ShareRecord, SharedGrant, VaultStore};
