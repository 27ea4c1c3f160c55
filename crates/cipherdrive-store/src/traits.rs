//! Adapter traits for the ledger, the blob store and the local vault store.
//!
//! The ledger and blob store are external systems. These traits are the
//! whole surface cipherdrive needs from them; every implementation must be
//! `Send + Sync` so a drive can be shared across tasks.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use cipherdrive_core::{AccountId, ContentId, FileMetadata, SharedFile};

use crate::error::{BlobResult, LedgerResult, Result};

/// A new owned-file record, written once per upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFile {
    pub file_id: ContentId,
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,

    /// The owner's self-grant, bare lowercase hex.
    pub wrapped_key_hex: String,
}

/// A share record, written once per (file, recipient) and overwritten on
/// re-share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub file_id: ContentId,
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    pub recipient: AccountId,

    /// The recipient's grant, `0x`-prefixed lowercase hex.
    pub wrapped_key_hex: String,
}

/// A grantee's wrapped key together with the account that sealed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedGrant {
    pub shared_by: AccountId,
    pub wrapped_key_hex: String,
}

/// The public access-control ledger.
///
/// The caller's account is passed explicitly on every write. Reads that find
/// nothing return `None` or an empty list rather than an error.
///
/// Writes keyed by `(file_id, recipient)` are last-write-wins.
#[async_trait]
pub trait Ledger: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Identity
    // ─────────────────────────────────────────────────────────────────────────

    /// Publish an account's public key (hex). Fails if one is already set.
    async fn set_public_key(&self, account: &AccountId, public_key_hex: &str) -> LedgerResult<()>;

    /// Look up an account's published public key.
    async fn get_public_key(&self, account: &AccountId) -> LedgerResult<Option<String>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Owned Files
    // ─────────────────────────────────────────────────────────────────────────

    /// Record a new owned file with its self-grant.
    ///
    /// Returns the stored metadata, including the ledger-assigned timestamp.
    async fn add_file(&self, owner: &AccountId, file: NewFile) -> LedgerResult<FileMetadata>;

    /// All files owned by an account, in upload order.
    async fn get_files(&self, owner: &AccountId) -> LedgerResult<Vec<FileMetadata>>;

    /// The owner's self-grant for a file.
    async fn get_encrypted_key(
        &self,
        owner: &AccountId,
        file_id: &ContentId,
    ) -> LedgerResult<Option<String>>;

    /// Remove an owned file and every grant issued for it.
    async fn delete_file(&self, owner: &AccountId, file_id: &ContentId) -> LedgerResult<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Sharing
    // ─────────────────────────────────────────────────────────────────────────

    /// Record (or overwrite) a grant for a recipient.
    async fn share_file(&self, sender: &AccountId, share: ShareRecord) -> LedgerResult<()>;

    /// Remove the grant `owner` issued to a recipient. Removing a missing
    /// grant is not an error.
    async fn revoke_access(
        &self,
        owner: &AccountId,
        file_id: &ContentId,
        recipient: &AccountId,
    ) -> LedgerResult<()>;

    /// All files shared with an account.
    async fn get_shared_files(&self, recipient: &AccountId) -> LedgerResult<Vec<SharedFile>>;

    /// Files shared with an account by one sender.
    async fn get_shared_files_by_sender(
        &self,
        recipient: &AccountId,
        sender: &AccountId,
    ) -> LedgerResult<Vec<SharedFile>>;

    /// Distinct accounts that have shared with this recipient, in first-share
    /// order.
    async fn get_all_senders(&self, recipient: &AccountId) -> LedgerResult<Vec<AccountId>>;

    /// A recipient's grant for a file.
    async fn get_encrypted_passkey(
        &self,
        recipient: &AccountId,
        file_id: &ContentId,
    ) -> LedgerResult<Option<SharedGrant>>;
}

/// A content-addressed blob store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes and return their content id.
    async fn put(&self, data: Bytes) -> BlobResult<ContentId>;

    /// Fetch bytes by content id.
    async fn get(&self, cid: &ContentId) -> BlobResult<Bytes>;
}

/// Local device storage for passphrase-sealed vault records.
///
/// Records are write-once per account.
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Store a record. Fails with `AlreadyExists` if the account has one.
    async fn put_vault(&self, account: &AccountId, record: &[u8]) -> Result<()>;

    /// Load an account's record.
    async fn get_vault(&self, account: &AccountId) -> Result<Option<Vec<u8>>>;

    /// Check whether an account has a record.
    async fn has_vault(&self, account: &AccountId) -> Result<bool> {
        Ok(self.get_vault(account).await?.is_some())
    }
}
