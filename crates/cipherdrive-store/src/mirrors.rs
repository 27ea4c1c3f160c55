//! Reads across a primary blob store and its mirrors.
//!
//! Content-addressed gateways are interchangeable for reads, but any one of
//! them may be down or may serve the wrong bytes. [`BlobMirrors`] tries the
//! primary first and then each mirror in order, one request apiece, and
//! accepts the first response that passes the caller's verification.
//!
//! Writes always go to the primary.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};

use cipherdrive_core::ContentId;

use crate::error::{BlobError, BlobResult};
use crate::traits::BlobStore;

/// A primary blob store plus read-only mirrors.
pub struct BlobMirrors<B> {
    primary: B,
    mirrors: Vec<Arc<dyn BlobStore>>,
}

impl<B: BlobStore> BlobMirrors<B> {
    /// Wrap a primary store with no mirrors.
    pub fn new(primary: B) -> Self {
        Self {
            primary,
            mirrors: Vec::new(),
        }
    }

    /// Append a mirror. Mirrors are tried in the order they were added.
    pub fn push_mirror(&mut self, mirror: Arc<dyn BlobStore>) {
        self.mirrors.push(mirror);
    }

    /// The primary store.
    pub fn primary(&self) -> &B {
        &self.primary
    }

    /// Number of mirrors, not counting the primary.
    pub fn mirror_count(&self) -> usize {
        self.mirrors.len()
    }

    /// Fetch a blob and return the first response that `verify` accepts.
    ///
    /// If some source returned bytes that failed verification, that failure
    /// is reported. Otherwise the last fetch error is converted into `E`.
    pub async fn get_verified<T, E, F>(&self, cid: &ContentId, mut verify: F) -> Result<T, E>
    where
        F: FnMut(&[u8]) -> Result<T, E>,
        E: From<BlobError>,
    {
        let mut rejected: Option<E> = None;
        let mut last_fetch_error = BlobError::NotFound(cid.clone());

        let mut sources: Vec<&dyn BlobStore> = Vec::with_capacity(1 + self.mirrors.len());
        sources.push(&self.primary);
        sources.extend(self.mirrors.iter().map(|m| m.as_ref() as &dyn BlobStore));

        for (index, source) in sources.into_iter().enumerate() {
            match source.get(cid).await {
                Ok(bytes) => match verify(&bytes) {
                    Ok(value) => {
                        debug!(cid = %cid, source = index, "blob verified");
                        return Ok(value);
                    }
                    Err(e) => {
                        warn!(cid = %cid, source = index, "blob failed verification");
                        rejected = Some(e);
                    }
                },
                Err(e) => {
                    warn!(cid = %cid, source = index, error = %e, "blob fetch failed");
                    last_fetch_error = e;
                }
            }
        }

        Err(rejected.unwrap_or_else(|| E::from(last_fetch_error)))
    }
}

#[async_trait]
impl<B: BlobStore> BlobStore for BlobMirrors<B> {
    async fn put(&self, data: Bytes) -> BlobResult<ContentId> {
        self.primary.put(data).await
    }

    /// First successful fetch, unverified.
    async fn get(&self, cid: &ContentId) -> BlobResult<Bytes> {
        self.get_verified(cid, |bytes| Ok::<_, BlobError>(Bytes::copy_from_slice(bytes)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBlobStore;

    #[derive(Debug, PartialEq)]
    enum Check {
        Blob(BlobError),
        Bad,
    }

    impl From<BlobError> for Check {
        fn from(e: BlobError) -> Self {
            Check::Blob(e)
        }
    }

    fn accept_abc(bytes: &[u8]) -> Result<Vec<u8>, Check> {
        if bytes == b"abc" {
            Ok(bytes.to_vec())
        } else {
            Err(Check::Bad)
        }
    }

    #[tokio::test]
    async fn test_primary_wins_when_valid() {
        let mirrors = BlobMirrors::new(MemoryBlobStore::new());
        let cid = mirrors.put(Bytes::from_static(b"abc")).await.unwrap();

        let got = mirrors.get_verified(&cid, accept_abc).await.unwrap();
        assert_eq!(got, b"abc");
    }

    #[tokio::test]
    async fn test_falls_back_past_offline_and_tampered_sources() {
        let primary = MemoryBlobStore::new();
        let cid = primary.put(Bytes::from_static(b"abc")).await.unwrap();
        primary.set_offline(true);

        let tampered = Arc::new(MemoryBlobStore::new());
        tampered.insert_raw(cid.clone(), Bytes::from_static(b"xyz"));

        let honest = Arc::new(MemoryBlobStore::new());
        honest.insert_raw(cid.clone(), Bytes::from_static(b"abc"));

        let mut mirrors = BlobMirrors::new(primary);
        mirrors.push_mirror(tampered);
        mirrors.push_mirror(honest);
        assert_eq!(mirrors.mirror_count(), 2);

        let got = mirrors.get_verified(&cid, accept_abc).await.unwrap();
        assert_eq!(got, b"abc");
    }

    #[tokio::test]
    async fn test_verification_failure_is_reported() {
        let primary = MemoryBlobStore::new();
        let cid = primary.put(Bytes::from_static(b"abc")).await.unwrap();
        primary.tamper(&cid, |b| b[0] = b'z');

        let mirrors = BlobMirrors::new(primary);
        assert_eq!(
            mirrors.get_verified(&cid, accept_abc).await,
            Err(Check::Bad)
        );
    }

    #[tokio::test]
    async fn test_all_unavailable() {
        let primary = MemoryBlobStore::new();
        primary.set_offline(true);
        let mut mirrors = BlobMirrors::new(primary);
        mirrors.push_mirror(Arc::new(MemoryBlobStore::new()));

        let cid = ContentId::new("missing").unwrap();
        let result = mirrors.get_verified(&cid, accept_abc).await;
        assert!(matches!(result, Err(Check::Blob(BlobError::NotFound(_)))));
    }

    #[tokio::test]
    async fn test_each_source_is_asked_once() {
        let primary = MemoryBlobStore::new();
        let cid = primary.put(Bytes::from_static(b"bad")).await.unwrap();
        let mut mirrors = BlobMirrors::new(primary);
        let mirror = Arc::new(MemoryBlobStore::new());
        mirror.insert_raw(cid.clone(), Bytes::from_static(b"bad"));
        mirrors.push_mirror(mirror);

        let mut calls = 0;
        let _ = mirrors
            .get_verified(&cid, |b| {
                calls += 1;
                accept_abc(b)
            })
            .await;
        assert_eq!(calls, 2);
    }
}
