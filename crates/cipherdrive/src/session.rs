//! The logged-in session.
//!
//! A [`Session`] owns the unlocked identity for one account and the file
//! lists fetched for it. Closing or dropping the session drops all of it at
//! once; the secret key is zeroized on drop. Switching accounts means closing
//! one session and logging in to get another.

use cipherdrive_core::{AccountId, ContentId, FileMetadata, SharedFile};
use cipherdrive_crypto::{KeyPair, PublicKey, SecretKey};

/// State for one logged-in account.
#[derive(Debug)]
pub struct Session {
    account: AccountId,
    keys: KeyPair,
    files: Option<Vec<FileMetadata>>,
    shared: Option<Vec<SharedFile>>,
}

impl Session {
    /// Start a session for an account with its unlocked key pair.
    pub fn open(account: AccountId, keys: KeyPair) -> Self {
        Self {
            account,
            keys,
            files: None,
            shared: None,
        }
    }

    /// End the session.
    pub fn close(self) {
        drop(self);
    }

    /// The logged-in account.
    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// The account's public key.
    pub fn public_key(&self) -> PublicKey {
        self.keys.public()
    }

    pub(crate) fn secret(&self) -> &SecretKey {
        self.keys.secret()
    }

    /// Owned files from the last listing, if any.
    pub fn cached_files(&self) -> Option<&[FileMetadata]> {
        self.files.as_deref()
    }

    /// Files shared with this account from the last listing, if any.
    pub fn cached_shared(&self) -> Option<&[SharedFile]> {
        self.shared.as_deref()
    }

    /// Drop cached listings so the next read goes to the ledger.
    pub fn invalidate(&mut self) {
        self.files = None;
        self.shared = None;
    }

    pub(crate) fn set_files(&mut self, files: Vec<FileMetadata>) {
        self.files = Some(files);
    }

    pub(crate) fn set_shared(&mut self, shared: Vec<SharedFile>) {
        self.shared = Some(shared);
    }

    pub(crate) fn push_file(&mut self, file: FileMetadata) {
        if let Some(files) = self.files.as_mut() {
            files.push(file);
        }
    }

    pub(crate) fn remove_file(&mut self, file_id: &ContentId) {
        if let Some(files) = self.files.as_mut() {
            files.retain(|f| &f.file_id != file_id);
        }
    }

    /// Case-insensitive name search over the cached listings.
    ///
    /// Returns nothing for a listing that has not been fetched yet.
    pub fn search(&self, query: &str) -> SearchResults {
        SearchResults {
            files: self
                .files
                .iter()
                .flatten()
                .filter(|f| f.matches_name(query))
                .cloned()
                .collect(),
            shared: self
                .shared
                .iter()
                .flatten()
                .filter(|s| s.metadata.matches_name(query))
                .cloned()
                .collect(),
        }
    }
}

/// Matches from [`Session::search`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub files: Vec<FileMetadata>,
    pub shared: Vec<SharedFile>,
}

impl SearchResults {
    /// Total number of matches.
    pub fn len(&self) -> usize {
        self.files.len() + self.shared.len()
    }

    /// Whether nothing matched.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str, name: &str) -> FileMetadata {
        FileMetadata {
            file_id: ContentId::new(id).unwrap(),
            file_name: name.into(),
            file_type: "text/plain".into(),
            file_size: 1,
            owner: AccountId::new("0xowner").unwrap(),
            uploaded_at: 0,
        }
    }

    fn session() -> Session {
        Session::open(AccountId::new("0xowner").unwrap(), KeyPair::generate())
    }

    #[test]
    fn test_open_exposes_identity() {
        let keys = KeyPair::generate();
        let public = keys.public();
        let session = Session::open(AccountId::new("0xABC").unwrap(), keys);

        assert_eq!(session.account().as_str(), "0xabc");
        assert_eq!(session.public_key(), public);
        assert!(session.cached_files().is_none());
    }

    #[test]
    fn test_cache_updates() {
        let mut session = session();
        session.push_file(file("a", "a.txt"));
        assert!(session.cached_files().is_none());

        session.set_files(vec![file("a", "a.txt")]);
        session.push_file(file("b", "b.txt"));
        assert_eq!(session.cached_files().unwrap().len(), 2);

        session.remove_file(&ContentId::new("a").unwrap());
        assert_eq!(session.cached_files().unwrap()[0].file_name, "b.txt");

        session.invalidate();
        assert!(session.cached_files().is_none());
    }

    #[test]
    fn test_search() {
        let mut session = session();
        session.set_files(vec![file("a", "Budget 2024.xlsx"), file("b", "notes.txt")]);
        session.set_shared(vec![SharedFile {
            metadata: file("c", "shared budget.pdf"),
            shared_by: AccountId::new("0xfriend").unwrap(),
        }]);

        let results = session.search("BUDGET");
        assert_eq!(results.files.len(), 1);
        assert_eq!(results.shared.len(), 1);
        assert_eq!(results.len(), 2);

        assert!(session.search("missing").is_empty());
        assert_eq!(session.search("").len(), 3);
    }
}
