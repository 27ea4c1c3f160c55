//! Drive configuration.

use serde::{Deserialize, Serialize};

use cipherdrive_crypto::KdfParams;

use crate::error::{DriveError, Result};

/// Configuration for a [`Drive`](crate::Drive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Argon2id cost for newly created vaults. Existing vaults carry their own.
    pub kdf: KdfParams,

    /// Largest accepted upload in bytes. `None` means unlimited.
    pub max_upload_bytes: Option<u64>,

    /// Shortest accepted passphrase when creating a vault.
    pub min_passphrase_len: usize,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            kdf: KdfParams::default(),
            max_upload_bytes: None,
            min_passphrase_len: 8,
        }
    }
}

impl DriveConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DriveError::Config(e.to_string()))
    }

    /// Set the upload limit.
    pub fn with_max_upload_bytes(mut self, limit: u64) -> Self {
        self.max_upload_bytes = Some(limit);
        self
    }

    /// Set the KDF cost for new vaults.
    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }
}
