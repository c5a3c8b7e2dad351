//! Object store gateway: opaque key-addressed blob put/get/delete.
//!
//! The trait is the seam the coordinator and the viewer load against; the
//! filesystem and in-memory backends below implement the same contract a
//! remote object store would, so swapping in one costs a single impl.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::gateway::error::{GatewayError, GatewayResult};
use crate::gateway::types::StorageKey;

/// unified blob store access trait
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// backend name (for logs and notifications)
    fn provider_name(&self) -> &'static str;

    /// Write a blob under the key.
    ///
    /// With `overwrite` false the call fails if a blob is already stored at
    /// the key; with `overwrite` true the bytes replace the existing blob in
    /// place (same key, new bytes).
    async fn put(
        &self,
        key: &StorageKey,
        bytes: &[u8],
        content_type: &str,
        overwrite: bool,
    ) -> GatewayResult<()>;

    /// Read the blob stored under the key.
    async fn get(&self, key: &StorageKey) -> GatewayResult<Vec<u8>>;

    /// Delete the blob stored under the key.
    ///
    /// The coordinator does not invoke this on document deletion (see
    /// `FileOperations::delete`); it exists for callers that do their own
    /// reconciliation.
    async fn delete(&self, key: &StorageKey) -> GatewayResult<()>;
}

/// Blob store rooted at a directory: one file per key, key segments become
/// path segments. `StorageKey` validation already rules out traversal, so a
/// key can never resolve outside the root.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Open a blob store rooted at `root`, creating the directory if missing.
    pub fn open(root: impl AsRef<Path>) -> GatewayResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn blob_path(&self, key: &StorageKey) -> PathBuf {
        self.root.join(key.as_str())
    }
}

#[async_trait]
impl StorageGateway for FsStorage {
    fn provider_name(&self) -> &'static str {
        "fs"
    }

    async fn put(
        &self,
        key: &StorageKey,
        bytes: &[u8],
        content_type: &str,
        overwrite: bool,
    ) -> GatewayResult<()> {
        let path = self.blob_path(key);

        if !overwrite && tokio::fs::try_exists(&path).await? {
            return Err(GatewayError::BlobAlreadyExists(key.to_string()));
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(key = %key, content_type, size = bytes.len(), "blob written");
        Ok(())
    }

    async fn get(&self, key: &StorageKey) -> GatewayResult<Vec<u8>> {
        let path = self.blob_path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(GatewayError::BlobNotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &StorageKey) -> GatewayResult<()> {
        let path = self.blob_path(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(GatewayError::BlobNotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory blob store for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: Arc<RwLock<HashMap<StorageKey, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// number of stored blobs
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

#[async_trait]
impl StorageGateway for MemoryStorage {
    fn provider_name(&self) -> &'static str {
        "memory"
    }

    async fn put(
        &self,
        key: &StorageKey,
        bytes: &[u8],
        _content_type: &str,
        overwrite: bool,
    ) -> GatewayResult<()> {
        let mut blobs = self.blobs.write();
        if !overwrite && blobs.contains_key(key) {
            return Err(GatewayError::BlobAlreadyExists(key.to_string()));
        }
        blobs.insert(key.clone(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, key: &StorageKey) -> GatewayResult<Vec<u8>> {
        self.blobs
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| GatewayError::BlobNotFound(key.to_string()))
    }

    async fn delete(&self, key: &StorageKey) -> GatewayResult<()> {
        self.blobs
            .write()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| GatewayError::BlobNotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::types::MEDIA_TYPE;

    #[tokio::test]
    async fn test_fs_put_get_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FsStorage::open(dir.path()).unwrap();

        let key = StorageKey::generate("notes.md");
        store.put(&key, b"# Hi", MEDIA_TYPE, false).await.unwrap();

        let bytes = store.get(&key).await.unwrap();
        assert_eq!(bytes, b"# Hi");
    }

    #[tokio::test]
    async fn test_fs_put_no_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FsStorage::open(dir.path()).unwrap();

        let key = StorageKey::generate("notes.md");
        store.put(&key, b"one", MEDIA_TYPE, false).await.unwrap();

        let second = store.put(&key, b"two", MEDIA_TYPE, false).await;
        assert!(matches!(second, Err(GatewayError::BlobAlreadyExists(_))));

        // original bytes untouched
        assert_eq!(store.get(&key).await.unwrap(), b"one");
    }

    #[tokio::test]
    async fn test_fs_put_overwrite_replaces_in_place() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FsStorage::open(dir.path()).unwrap();

        let key = StorageKey::generate("notes.md");
        store.put(&key, b"old", MEDIA_TYPE, false).await.unwrap();
        store.put(&key, b"new", MEDIA_TYPE, true).await.unwrap();

        assert_eq!(store.get(&key).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_fs_get_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FsStorage::open(dir.path()).unwrap();

        let key = StorageKey::new("missing/notes.md").unwrap();
        let result = store.get(&key).await;
        assert!(matches!(result, Err(GatewayError::BlobNotFound(_))));
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_fs_delete() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FsStorage::open(dir.path()).unwrap();

        let key = StorageKey::generate("notes.md");
        store.put(&key, b"bye", MEDIA_TYPE, false).await.unwrap();
        store.delete(&key).await.unwrap();

        assert!(store.get(&key).await.is_err());
        assert!(matches!(
            store.delete(&key).await,
            Err(GatewayError::BlobNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_contract_matches_fs() {
        let store = MemoryStorage::new();
        let key = StorageKey::generate("notes.md");

        store.put(&key, b"one", MEDIA_TYPE, false).await.unwrap();
        assert!(matches!(
            store.put(&key, b"two", MEDIA_TYPE, false).await,
            Err(GatewayError::BlobAlreadyExists(_))
        ));

        store.put(&key, b"two", MEDIA_TYPE, true).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), b"two");

        store.delete(&key).await.unwrap();
        assert!(store.is_empty());
    }
}
