//! Storage-backed passphrase vault.
//!
//! Binds the pure seal/open functions from `cipherdrive_crypto::vault` to a
//! [`VaultStore`]. Key stretching runs on the blocking pool.

use tracing::{debug, instrument, warn};
use zeroize::Zeroizing;

use cipherdrive_core::AccountId;
use cipherdrive_crypto::{vault, KdfParams, SecretKey};
use cipherdrive_store::{StoreError, VaultStore};

use crate::error::{DriveError, Result};

/// Per-account sealed secret keys on local storage.
pub struct KeyVault<V> {
    store: V,
    params: KdfParams,
    min_passphrase_len: usize,
}

impl<V: VaultStore> KeyVault<V> {
    /// Create a vault over a store, sealing new records with `params`.
    pub fn new(store: V, params: KdfParams, min_passphrase_len: usize) -> Self {
        Self {
            store,
            params,
            min_passphrase_len,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &V {
        &self.store
    }

    /// Whether an account has a vault on this device.
    pub async fn exists(&self, account: &AccountId) -> Result<bool> {
        Ok(self.store.has_vault(account).await?)
    }

    /// Seal and store an account's secret key.
    ///
    /// Write-once: fails with `VaultExists` if the account already has one.
    #[instrument(skip_all, fields(account = %account.short()))]
    pub async fn create(
        &self,
        account: &AccountId,
        secret: &SecretKey,
        passphrase: &str,
    ) -> Result<()> {
        if passphrase.chars().count() < self.min_passphrase_len {
            return Err(DriveError::WeakPassphrase {
                min: self.min_passphrase_len,
            });
        }
        if self.exists(account).await? {
            return Err(DriveError::VaultExists(account.clone()));
        }

        let secret_bytes = secret.to_bytes();
        let passphrase = Zeroizing::new(passphrase.to_string());
        let params = self.params;

        let record = tokio::task::spawn_blocking(move || {
            vault::seal(&SecretKey::from_bytes(*secret_bytes), &passphrase, params)
        })
        .await
        .map_err(|e| StoreError::Task(format!("key derivation task failed: {e}")))??;

        self.store
            .put_vault(account, &record)
            .await
            .map_err(|e| match e {
                StoreError::AlreadyExists(_) => DriveError::VaultExists(account.clone()),
                other => DriveError::Vault(other),
            })?;

        debug!("vault created");
        Ok(())
    }

    /// Unlock an account's secret key.
    ///
    /// A wrong passphrase and a corrupt record both fail with
    /// `Authentication`.
    #[instrument(skip_all, fields(account = %account.short()))]
    pub async fn open(&self, account: &AccountId, passphrase: &str) -> Result<SecretKey> {
        let record = self
            .store
            .get_vault(account)
            .await?
            .ok_or_else(|| DriveError::NoVault(account.clone()))?;

        let passphrase = Zeroizing::new(passphrase.to_string());
        let opened = tokio::task::spawn_blocking(move || vault::open(&record, &passphrase))
            .await
            .map_err(|e| StoreError::Task(format!("key derivation task failed: {e}")))?;

        match opened {
            Ok(secret) => Ok(secret),
            Err(e) => {
                warn!("vault unlock failed");
                Err(e.into())
            }
        }
    }
}
