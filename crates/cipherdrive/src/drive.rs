//! The Drive: upload, download, share and revoke over a ledger and a blob
//! store.
//!
//! ## Protocol
//!
//! - **Upload**: encrypt under a fresh file key, store the blob, wrap the key
//!   for the owner (the self-grant) and record it on the ledger.
//! - **Share**: unwrap the owner's self-grant, re-wrap the same file key for
//!   the recipient and record the grant. No plaintext or file key ever
//!   reaches the ledger or the blob store.
//! - **Revoke**: remove the recipient's grant. This is not cryptographic
//!   revocation: a recipient who already unwrapped the key keeps it.
//! - **View**: the owner opens the self-grant; a grantee opens their grant
//!   using the sharer's published key.
//!
//! The ledger write is the commit point of every operation. Nothing is
//! retried internally.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, instrument, warn};

use cipherdrive_core::{AccountId, ContentId, FileMetadata, SharedFile};
use cipherdrive_crypto::{
    decrypt_file, encrypt_file, unwrap, wrap, FileKey, KeyPair, PublicKey, WrappedKey,
};
use cipherdrive_store::{BlobMirrors, BlobStore, Ledger, NewFile, ShareRecord, VaultStore};

use crate::config::DriveConfig;
use crate::error::{DriveError, Result};
use crate::keyvault::KeyVault;
use crate::session::{SearchResults, Session};

/// Client for encrypted file storage.
///
/// Stateless between calls apart from configuration; per-account state
/// lives in [`Session`].
pub struct Drive<L, B, V> {
    ledger: Arc<L>,
    blobs: BlobMirrors<B>,
    vault: KeyVault<V>,
    config: DriveConfig,
}

impl<L, B, V> Drive<L, B, V>
where
    L: Ledger,
    B: BlobStore,
    V: VaultStore,
{
    /// Create a drive over a ledger, a primary blob store and a vault store.
    pub fn new(ledger: L, blobs: B, vaults: V, config: DriveConfig) -> Self {
        let vault = KeyVault::new(vaults, config.kdf, config.min_passphrase_len);
        Self {
            ledger: Arc::new(ledger),
            blobs: BlobMirrors::new(blobs),
            vault,
            config,
        }
    }

    /// Add a read mirror for blob fetches.
    pub fn with_mirror(mut self, mirror: Arc<dyn BlobStore>) -> Self {
        self.blobs.push_mirror(mirror);
        self
    }

    /// The ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// The primary blob store.
    pub fn blobs(&self) -> &B {
        self.blobs.primary()
    }

    /// The key vault.
    pub fn vault(&self) -> &KeyVault<V> {
        &self.vault
    }

    /// The configuration.
    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────

    /// Log in, creating an identity on first use.
    ///
    /// - With a vault on this device, the vault is unlocked and the derived
    ///   public key must match the published one. If nothing is published
    ///   yet (an earlier publish failed), it is published now.
    /// - Without a vault, a new key pair is generated, sealed and published.
    ///   If the account already has a published key, login fails with
    ///   `AlreadyRegistered` instead of replacing it.
    #[instrument(skip_all, fields(account = %account.short()))]
    pub async fn login(&self, account: &AccountId, passphrase: &str) -> Result<Session> {
        let published = self.resolve_public_key(account).await?;

        let keys = if self.vault.exists(account).await? {
            let keys = KeyPair::from_secret(self.vault.open(account, passphrase).await?);
            match published {
                Some(pk) if !keys.matches(&pk) => {
                    warn!("unlocked key does not match published key");
                    return Err(DriveError::IdentityMismatch(account.clone()));
                }
                Some(_) => debug!("returning user"),
                None => self.publish(account, &keys).await?,
            }
            keys
        } else {
            if published.is_some() {
                warn!("account has a published key but no vault on this device");
                return Err(DriveError::AlreadyRegistered(account.clone()));
            }

            let keys = KeyPair::generate();
            self.vault
                .create(account, keys.secret(), passphrase)
                .await?;
            self.publish(account, &keys).await?;
            info!("new identity registered");
            keys
        };

        Ok(Session::open(account.clone(), keys))
    }

    async fn publish(&self, account: &AccountId, keys: &KeyPair) -> Result<()> {
        self.ledger
            .set_public_key(account, &keys.public().to_hex())
            .await?;
        info!(account = %account.short(), "public key published");
        Ok(())
    }

    async fn resolve_public_key(&self, account: &AccountId) -> Result<Option<PublicKey>> {
        match self.ledger.get_public_key(account).await? {
            Some(hex) => Ok(Some(PublicKey::from_hex(&hex)?)),
            None => Ok(None),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Owned Files
    // ─────────────────────────────────────────────────────────────────────────

    /// Encrypt and store a file, recording it with a self-grant.
    #[instrument(skip_all, fields(account = %session.account().short(), file_name = %file_name, size = data.len()))]
    pub async fn upload(
        &self,
        session: &mut Session,
        file_name: &str,
        file_type: &str,
        data: &[u8],
    ) -> Result<FileMetadata> {
        let size = data.len() as u64;
        if let Some(limit) = self.config.max_upload_bytes {
            if size > limit {
                return Err(DriveError::FileTooLarge { size, limit });
            }
        }

        let (file_key, blob) = encrypt_file(data)?.into_parts();
        let file_id = self.blobs.put(Bytes::from(blob)).await?;
        debug!(file_id = %file_id, "blob stored");

        let self_grant = wrap(&file_key, session.secret(), &session.public_key())?;
        drop(file_key);

        let metadata = self
            .ledger
            .add_file(
                session.account(),
                NewFile {
                    file_id,
                    file_name: file_name.to_string(),
                    file_type: file_type.to_string(),
                    file_size: size,
                    wrapped_key_hex: self_grant.to_hex(),
                },
            )
            .await?;

        info!(file_id = %metadata.file_id, "file recorded");
        session.push_file(metadata.clone());
        Ok(metadata)
    }

    /// Decrypt a file the session's account owns.
    #[instrument(skip_all, fields(account = %session.account().short(), file_id = %file_id))]
    pub async fn download(&self, session: &Session, file_id: &ContentId) -> Result<Vec<u8>> {
        let file_key = self
            .owner_file_key(session, file_id)
            .await?
            .ok_or_else(|| DriveError::AccessDenied(file_id.clone()))?;
        self.fetch_and_decrypt(file_id, &file_key).await
    }

    /// Remove an owned file and every grant issued for it.
    ///
    /// The blob stays in the content-addressed store.
    #[instrument(skip_all, fields(account = %session.account().short(), file_id = %file_id))]
    pub async fn delete(&self, session: &mut Session, file_id: &ContentId) -> Result<()> {
        if self
            .ledger
            .get_encrypted_key(session.account(), file_id)
            .await?
            .is_none()
        {
            return Err(DriveError::AccessDenied(file_id.clone()));
        }

        self.ledger.delete_file(session.account(), file_id).await?;
        session.remove_file(file_id);
        info!("file deleted");
        Ok(())
    }

    /// List owned files and refresh the session cache.
    pub async fn list_files(&self, session: &mut Session) -> Result<Vec<FileMetadata>> {
        let files = self.ledger.get_files(session.account()).await?;
        session.set_files(files.clone());
        Ok(files)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sharing
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant a recipient access to an owned file.
    ///
    /// Re-sharing overwrites the previous grant with a fresh wrap.
    #[instrument(skip_all, fields(
        account = %session.account().short(),
        file_id = %file_id,
        recipient = %recipient.short(),
    ))]
    pub async fn share(
        &self,
        session: &Session,
        file_id: &ContentId,
        recipient: &AccountId,
    ) -> Result<()> {
        let recipient_key = self
            .resolve_public_key(recipient)
            .await?
            .ok_or_else(|| DriveError::RecipientNotRegistered(recipient.clone()))?;

        let Some(file_key) = self.owner_file_key(session, file_id).await? else {
            warn!("share attempted without a self-grant");
            return Err(DriveError::AccessDenied(file_id.clone()));
        };

        let grant = wrap(&file_key, session.secret(), &recipient_key)?;
        drop(file_key);

        let metadata = self
            .ledger
            .get_files(session.account())
            .await?
            .into_iter()
            .find(|f| &f.file_id == file_id)
            .ok_or_else(|| DriveError::AccessDenied(file_id.clone()))?;

        self.ledger
            .share_file(
                session.account(),
                ShareRecord {
                    file_id: file_id.clone(),
                    file_name: metadata.file_name,
                    file_type: metadata.file_type,
                    file_size: metadata.file_size,
                    recipient: recipient.clone(),
                    wrapped_key_hex: grant.to_prefixed_hex(),
                },
            )
            .await?;

        info!("file shared");
        Ok(())
    }

    /// Remove a recipient's grant.
    #[instrument(skip_all, fields(
        account = %session.account().short(),
        file_id = %file_id,
        recipient = %recipient.short(),
    ))]
    pub async fn revoke(
        &self,
        session: &Session,
        file_id: &ContentId,
        recipient: &AccountId,
    ) -> Result<()> {
        self.ledger
            .revoke_access(session.account(), file_id, recipient)
            .await?;
        info!("access revoked");
        Ok(())
    }

    /// Decrypt a file shared with the session's account.
    #[instrument(skip_all, fields(account = %session.account().short(), file_id = %file_id))]
    pub async fn download_shared(
        &self,
        session: &Session,
        file_id: &ContentId,
    ) -> Result<Vec<u8>> {
        let file_key = self
            .grantee_file_key(session, file_id)
            .await?
            .ok_or_else(|| {
                warn!("no grant for this account");
                DriveError::AccessDenied(file_id.clone())
            })?;
        self.fetch_and_decrypt(file_id, &file_key).await
    }

    /// Decrypt any file the session's account can read.
    ///
    /// Uses the self-grant when the account owns the file and its own grant
    /// otherwise.
    #[instrument(skip_all, fields(account = %session.account().short(), file_id = %file_id))]
    pub async fn view(&self, session: &Session, file_id: &ContentId) -> Result<Vec<u8>> {
        let file_key = match self.owner_file_key(session, file_id).await? {
            Some(key) => key,
            None => self
                .grantee_file_key(session, file_id)
                .await?
                .ok_or_else(|| {
                    warn!("no grant for this account");
                    DriveError::AccessDenied(file_id.clone())
                })?,
        };
        self.fetch_and_decrypt(file_id, &file_key).await
    }

    /// List files shared with the session's account and refresh the cache.
    pub async fn list_shared(&self, session: &mut Session) -> Result<Vec<SharedFile>> {
        let shared = self.ledger.get_shared_files(session.account()).await?;
        session.set_shared(shared.clone());
        Ok(shared)
    }

    /// Files shared with the session's account by one sender.
    pub async fn list_shared_by(
        &self,
        session: &Session,
        sender: &AccountId,
    ) -> Result<Vec<SharedFile>> {
        Ok(self
            .ledger
            .get_shared_files_by_sender(session.account(), sender)
            .await?)
    }

    /// Accounts that have shared files with the session's account.
    pub async fn senders(&self, session: &Session) -> Result<Vec<AccountId>> {
        Ok(self.ledger.get_all_senders(session.account()).await?)
    }

    /// Search owned and shared files by name, fetching listings not yet
    /// cached.
    pub async fn search(&self, session: &mut Session, query: &str) -> Result<SearchResults> {
        if session.cached_files().is_none() {
            self.list_files(session).await?;
        }
        if session.cached_shared().is_none() {
            self.list_shared(session).await?;
        }
        Ok(session.search(query))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Key Resolution
    // ─────────────────────────────────────────────────────────────────────────

    async fn owner_file_key(
        &self,
        session: &Session,
        file_id: &ContentId,
    ) -> Result<Option<FileKey>> {
        let Some(hex) = self
            .ledger
            .get_encrypted_key(session.account(), file_id)
            .await?
        else {
            return Ok(None);
        };

        let wrapped = WrappedKey::from_hex(&hex)?;
        let key = unwrap(&wrapped, &session.public_key(), session.secret())?;
        Ok(Some(key))
    }

    async fn grantee_file_key(
        &self,
        session: &Session,
        file_id: &ContentId,
    ) -> Result<Option<FileKey>> {
        let Some(grant) = self
            .ledger
            .get_encrypted_passkey(session.account(), file_id)
            .await?
        else {
            return Ok(None);
        };

        let sender_key = self
            .resolve_public_key(&grant.shared_by)
            .await?
            .ok_or_else(|| DriveError::UnknownSender(grant.shared_by.clone()))?;

        let wrapped = WrappedKey::from_hex(&grant.wrapped_key_hex)?;
        let key = unwrap(&wrapped, &sender_key, session.secret())?;
        Ok(Some(key))
    }

    async fn fetch_and_decrypt(&self, file_id: &ContentId, file_key: &FileKey) -> Result<Vec<u8>> {
        self.blobs
            .get_verified(file_id, |blob| {
                decrypt_file(file_key, blob).map_err(DriveError::from)
            })
            .await
    }
}
