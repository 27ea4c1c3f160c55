//! In-memory adapters.
//!
//! Reference implementations of [`Ledger`], [`BlobStore`] and [`VaultStore`]
//! with no persistence. They follow the same semantics a deployed ledger and
//! content-addressed store are expected to have, and can be switched offline
//! to exercise failure paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use cipherdrive_core::{AccountId, ContentId, FileMetadata, SharedFile};

use crate::error::{BlobError, BlobResult, LedgerError, LedgerResult, Result, StoreError};
use crate::traits::{BlobStore, Ledger, NewFile, ShareRecord, SharedGrant, VaultStore};

// ─────────────────────────────────────────────────────────────────────────────
// Ledger
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory ledger.
///
/// Thread-safe via RwLock. Holds the same records a deployed access-control
/// ledger would, keyed the same way.
#[derive(Default)]
pub struct MemoryLedger {
    inner: RwLock<LedgerInner>,
    offline: AtomicBool,
}

#[derive(Default)]
struct LedgerInner {
    /// Published public keys, hex.
    public_keys: HashMap<AccountId, String>,

    /// Owned files per owner, in upload order.
    files: HashMap<AccountId, Vec<OwnedEntry>>,

    /// Grants per recipient, in first-share order.
    shares: HashMap<AccountId, Vec<ShareEntry>>,
}

struct OwnedEntry {
    metadata: FileMetadata,
    wrapped_key_hex: String,
}

struct ShareEntry {
    metadata: FileMetadata,
    shared_by: AccountId,
    wrapped_key_hex: String,
}

impl ShareEntry {
    fn to_shared_file(&self) -> SharedFile {
        SharedFile {
            metadata: self.metadata.clone(),
            shared_by: self.shared_by.clone(),
        }
    }
}

impl MemoryLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the ledger becoming unreachable (or reachable again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of live grants across all recipients.
    pub fn grant_count(&self) -> usize {
        self.inner
            .read()
            .map(|inner| inner.shares.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    fn read(&self) -> LedgerResult<RwLockReadGuard<'_, LedgerInner>> {
        self.check_online()?;
        self.inner
            .read()
            .map_err(|e| LedgerError::Unavailable(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, LedgerInner>> {
        self.check_online()?;
        self.inner
            .write()
            .map_err(|e| LedgerError::Unavailable(format!("lock poisoned: {e}")))
    }

    fn check_online(&self) -> LedgerResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("ledger is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn set_public_key(&self, account: &AccountId, public_key_hex: &str) -> LedgerResult<()> {
        let mut inner = self.write()?;
        if inner.public_keys.contains_key(account) {
            return Err(LedgerError::Rejected(format!(
                "public key already set for {}",
                account.short()
            )));
        }
        inner
            .public_keys
            .insert(account.clone(), public_key_hex.to_string());
        Ok(())
    }

    async fn get_public_key(&self, account: &AccountId) -> LedgerResult<Option<String>> {
        Ok(self.read()?.public_keys.get(account).cloned())
    }

    async fn add_file(&self, owner: &AccountId, file: NewFile) -> LedgerResult<FileMetadata> {
        let mut inner = self.write()?;
        let owned = inner.files.entry(owner.clone()).or_default();

        if owned.iter().any(|e| e.metadata.file_id == file.file_id) {
            return Err(LedgerError::Rejected(format!(
                "file {} already recorded",
                file.file_id
            )));
        }

        let metadata = FileMetadata {
            file_id: file.file_id,
            file_name: file.file_name,
            file_type: file.file_type,
            file_size: file.file_size,
            owner: owner.clone(),
            uploaded_at: now_millis(),
        };

        owned.push(OwnedEntry {
            metadata: metadata.clone(),
            wrapped_key_hex: file.wrapped_key_hex,
        });

        Ok(metadata)
    }

    async fn get_files(&self, owner: &AccountId) -> LedgerResult<Vec<FileMetadata>> {
        let inner = self.read()?;
        Ok(inner
            .files
            .get(owner)
            .map(|owned| owned.iter().map(|e| e.metadata.clone()).collect())
            .unwrap_or_default())
    }

    async fn get_encrypted_key(
        &self,
        owner: &AccountId,
        file_id: &ContentId,
    ) -> LedgerResult<Option<String>> {
        let inner = self.read()?;
        Ok(inner.files.get(owner).and_then(|owned| {
            owned
                .iter()
                .find(|e| &e.metadata.file_id == file_id)
                .map(|e| e.wrapped_key_hex.clone())
        }))
    }

    async fn delete_file(&self, owner: &AccountId, file_id: &ContentId) -> LedgerResult<()> {
        let mut inner = self.write()?;

        let owned = inner.files.entry(owner.clone()).or_default();
        let before = owned.len();
        owned.retain(|e| &e.metadata.file_id != file_id);
        if owned.len() == before {
            return Err(LedgerError::Rejected(format!(
                "file {file_id} is not owned by {}",
                owner.short()
            )));
        }

        let mut removed = 0;
        for grants in inner.shares.values_mut() {
            let before = grants.len();
            grants.retain(|g| !(&g.metadata.file_id == file_id && &g.shared_by == owner));
            removed += before - grants.len();
        }

        debug!(file_id = %file_id, grants_removed = removed, "deleted file record");
        Ok(())
    }

    async fn share_file(&self, sender: &AccountId, share: ShareRecord) -> LedgerResult<()> {
        let mut inner = self.write()?;

        // The owner's upload time carries over when the sender owns the file.
        let uploaded_at = inner
            .files
            .get(sender)
            .and_then(|owned| owned.iter().find(|e| e.metadata.file_id == share.file_id))
            .map(|e| e.metadata.uploaded_at)
            .unwrap_or_else(now_millis);

        let entry = ShareEntry {
            metadata: FileMetadata {
                file_id: share.file_id,
                file_name: share.file_name,
                file_type: share.file_type,
                file_size: share.file_size,
                owner: sender.clone(),
                uploaded_at,
            },
            shared_by: sender.clone(),
            wrapped_key_hex: share.wrapped_key_hex,
        };

        let grants = inner.shares.entry(share.recipient).or_default();
        match grants
            .iter()
            .position(|g| g.metadata.file_id == entry.metadata.file_id)
        {
            Some(i) => grants[i] = entry,
            None => grants.push(entry),
        }

        Ok(())
    }

    /// Only grants issued by `owner` are removed.
    async fn revoke_access(
        &self,
        owner: &AccountId,
        file_id: &ContentId,
        recipient: &AccountId,
    ) -> LedgerResult<()> {
        let mut inner = self.write()?;
        if let Some(grants) = inner.shares.get_mut(recipient) {
            grants.retain(|g| &g.metadata.file_id != file_id || &g.shared_by != owner);
        }
        Ok(())
    }

    async fn get_shared_files(&self, recipient: &AccountId) -> LedgerResult<Vec<SharedFile>> {
        let inner = self.read()?;
        Ok(inner
            .shares
            .get(recipient)
            .map(|grants| grants.iter().map(ShareEntry::to_shared_file).collect())
            .unwrap_or_default())
    }

    async fn get_shared_files_by_sender(
        &self,
        recipient: &AccountId,
        sender: &AccountId,
    ) -> LedgerResult<Vec<SharedFile>> {
        let inner = self.read()?;
        Ok(inner
            .shares
            .get(recipient)
            .map(|grants| {
                grants
                    .iter()
                    .filter(|g| &g.shared_by == sender)
                    .map(ShareEntry::to_shared_file)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_all_senders(&self, recipient: &AccountId) -> LedgerResult<Vec<AccountId>> {
        let inner = self.read()?;
        let mut senders: Vec<AccountId> = Vec::new();
        if let Some(grants) = inner.shares.get(recipient) {
            for grant in grants {
                if !senders.contains(&grant.shared_by) {
                    senders.push(grant.shared_by.clone());
                }
            }
        }
        Ok(senders)
    }

    async fn get_encrypted_passkey(
        &self,
        recipient: &AccountId,
        file_id: &ContentId,
    ) -> LedgerResult<Option<SharedGrant>> {
        let inner = self.read()?;
        Ok(inner.shares.get(recipient).and_then(|grants| {
            grants
                .iter()
                .find(|g| &g.metadata.file_id == file_id)
                .map(|g| SharedGrant {
                    shared_by: g.shared_by.clone(),
                    wrapped_key_hex: g.wrapped_key_hex.clone(),
                })
        }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Blob store
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory content-addressed blob store.
///
/// Content ids are the lowercase hex BLAKE3 hash of the stored bytes, so
/// storing the same bytes twice yields the same id.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<ContentId, Bytes>>,
    offline: AtomicBool,
}

impl MemoryBlobStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the store becoming unreachable (or reachable again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite stored bytes in place, keeping the content id.
    ///
    /// Models a misbehaving gateway that serves the wrong bytes.
    pub fn tamper(&self, cid: &ContentId, f: impl FnOnce(&mut Vec<u8>)) -> bool {
        let Ok(mut blobs) = self.blobs.write() else {
            return false;
        };
        match blobs.get_mut(cid) {
            Some(bytes) => {
                let mut data = bytes.to_vec();
                f(&mut data);
                *bytes = Bytes::from(data);
                true
            }
            None => false,
        }
    }

    /// Store bytes under an explicit id, bypassing content addressing.
    ///
    /// Used to seed mirrors that hold a copy of another store's blob.
    pub fn insert_raw(&self, cid: ContentId, data: Bytes) {
        if let Ok(mut blobs) = self.blobs.write() {
            blobs.insert(cid, data);
        }
    }

    fn check_online(&self) -> BlobResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(BlobError::Unavailable("blob store is offline".into()));
        }
        Ok(())
    }
}

/// Compute the content id the memory store assigns to some bytes.
pub fn content_id_for(data: &[u8]) -> BlobResult<ContentId> {
    ContentId::new(hex::encode(blake3::hash(data).as_bytes()))
        .map_err(|e| BlobError::Unavailable(e.to_string()))
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, data: Bytes) -> BlobResult<ContentId> {
        self.check_online()?;
        let cid = content_id_for(&data)?;
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| BlobError::Unavailable(format!("lock poisoned: {e}")))?;
        blobs.insert(cid.clone(), data);
        Ok(cid)
    }

    async fn get(&self, cid: &ContentId) -> BlobResult<Bytes> {
        self.check_online()?;
        let blobs = self
            .blobs
            .read()
            .map_err(|e| BlobError::Unavailable(format!("lock poisoned: {e}")))?;
        blobs
            .get(cid)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(cid.clone()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Vault store
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory vault store.
#[derive(Default)]
pub struct MemoryVaultStore {
    records: RwLock<HashMap<AccountId, Vec<u8>>>,
}

impl MemoryVaultStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VaultStore for MemoryVaultStore {
    async fn put_vault(&self, account: &AccountId, record: &[u8]) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Task(format!("lock poisoned: {e}")))?;
        if records.contains_key(account) {
            return Err(StoreError::AlreadyExists(account.to_string()));
        }
        records.insert(account.clone(), record.to_vec());
        Ok(())
    }

    async fn get_vault(&self, account: &AccountId) -> Result<Option<Vec<u8>>> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Task(format!("lock poisoned: {e}")))?;
        Ok(records.get(account).cloned())
    }
}

fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
