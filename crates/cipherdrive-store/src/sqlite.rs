//! SQLite implementation of the vault store.
//!
//! Persists sealed vault records on the local device. Uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use cipherdrive_core::AccountId;

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::VaultStore;

/// SQLite-based vault store.
///
/// Thread-safe via internal Mutex.
pub struct SqliteVaultStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteVaultStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking closure against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Task(format!("mutex poisoned: {e}")))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {e}")))?
    }
}

#[async_trait]
impl VaultStore for SqliteVaultStore {
    async fn put_vault(&self, account: &AccountId, record: &[u8]) -> Result<()> {
        let account = account.clone();
        let record = record.to_vec();

        self.with_conn(move |conn| {
            let existing: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM vault_records WHERE account_id = ?1",
                    params![account.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            if existing.is_some() {
                return Err(StoreError::AlreadyExists(account.to_string()));
            }

            conn.execute(
                "INSERT INTO vault_records (account_id, record, created_at) VALUES (?1, ?2, ?3)",
                params![account.as_str(), record, now_millis()],
            )?;

            debug!(account = %account.short(), "stored vault record");
            Ok(())
        })
        .await
    }

    async fn get_vault(&self, account: &AccountId) -> Result<Option<Vec<u8>>> {
        let account = account.clone();

        self.with_conn(move |conn| {
            let record = conn
                .query_row(
                    "SELECT record FROM vault_records WHERE account_id = ?1",
                    params![account.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(record)
        })
        .await
    }

    async fn has_vault(&self, account: &AccountId) -> Result<bool> {
        let account = account.clone();

        self.with_conn(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM vault_records WHERE account_id = ?1",
                params![account.as_str()],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
    }
}

fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = SqliteVaultStore::open_memory().unwrap();
        let alice = account("0xAlice");

        assert!(!store.has_vault(&alice).await.unwrap());
        assert_eq!(store.get_vault(&alice).await.unwrap(), None);

        store.put_vault(&alice, b"sealed").await.unwrap();

        assert!(store.has_vault(&alice).await.unwrap());
        assert_eq!(
            store.get_vault(&account("0xALICE")).await.unwrap(),
            Some(b"sealed".to_vec())
        );
    }

    #[tokio::test]
    async fn test_write_once() {
        let store = SqliteVaultStore::open_memory().unwrap();
        let alice = account("0xalice");

        store.put_vault(&alice, b"first").await.unwrap();
        assert!(matches!(
            store.put_vault(&alice, b"second").await,
            Err(StoreError::AlreadyExists(_))
        ));
        assert_eq!(
            store.get_vault(&alice).await.unwrap(),
            Some(b"first".to_vec())
        );
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.db");
        let alice = account("0xalice");

        {
            let store = SqliteVaultStore::open(&path).unwrap();
            store.put_vault(&alice, b"sealed").await.unwrap();
        }

        let store = SqliteVaultStore::open(&path).unwrap();
        assert_eq!(
            store.get_vault(&alice).await.unwrap(),
            Some(b"sealed".to_vec())
        );
    }
}
