//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use cipherdrive::{Drive, DriveConfig, Session};
use cipherdrive_core::AccountId;
use cipherdrive_crypto::KdfParams;
use cipherdrive_store::{MemoryBlobStore, MemoryLedger, MemoryVaultStore};

/// A drive over in-memory adapters.
pub type TestDrive = Drive<MemoryLedger, MemoryBlobStore, MemoryVaultStore>;

/// Configuration with a minimal KDF cost so tests stay fast.
pub fn test_config() -> DriveConfig {
    DriveConfig::default().with_kdf(KdfParams::insecure_fast())
}

/// A named test account with a fixed passphrase.
#[derive(Debug, Clone)]
pub struct TestAccount {
    pub name: String,
    pub id: AccountId,
    pub passphrase: String,
}

impl TestAccount {
    /// Create an account whose address and passphrase derive from `name`.
    pub fn new(name: &str) -> Self {
        let id = AccountId::new(format!("0x{}", hex::encode(name.as_bytes())))
            .expect("non-empty account id");
        Self {
            name: name.to_string(),
            id,
            passphrase: format!("{name} passphrase"),
        }
    }
}

/// A drive fixture.
pub struct DriveFixture {
    pub drive: TestDrive,
}

impl DriveFixture {
    /// Create a fixture with the fast test configuration.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a fixture with a custom configuration.
    pub fn with_config(config: DriveConfig) -> Self {
        Self {
            drive: Drive::new(
                MemoryLedger::new(),
                MemoryBlobStore::new(),
                MemoryVaultStore::new(),
                config,
            ),
        }
    }

    /// The in-memory ledger.
    pub fn ledger(&self) -> &MemoryLedger {
        self.drive.ledger()
    }

    /// The in-memory primary blob store.
    pub fn blobs(&self) -> &MemoryBlobStore {
        self.drive.blobs()
    }

    /// Create an account and log it in for the first time.
    pub async fn register(&self, name: &str) -> (TestAccount, Session) {
        let account = TestAccount::new(name);
        let session = self.login(&account).await;
        (account, session)
    }

    /// Log an account in with its passphrase.
    pub async fn login(&self, account: &TestAccount) -> Session {
        self.drive
            .login(&account.id, &account.passphrase)
            .await
            .expect("login should succeed")
    }
}

impl Default for DriveFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create several distinct accounts for multi-party tests.
pub fn multi_party_accounts(count: usize) -> Vec<TestAccount> {
    (0..count)
        .map(|i| TestAccount::new(&format!("party-{i}")))
        .collect()
}
