//! Record store gateway: document metadata CRUD with server-assigned ids.
//!
//! The record store is the system of record for `DocumentRecord`. Listing
//! returns read-projections in insertion order, the ordering the navigator
//! relies on for next/previous.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::gateway::error::{GatewayError, GatewayResult};
use crate::gateway::types::{DocumentId, DocumentListEntry, DocumentRecord, RecordPatch, StorageKey};

/// unified record store access trait
#[async_trait]
pub trait MetadataGateway: Send + Sync {
    /// backend name (for logs and notifications)
    fn provider_name(&self) -> &'static str;

    /// List all document entries in insertion order.
    async fn list(&self) -> GatewayResult<Vec<DocumentListEntry>>;

    /// Insert a new record, returning the server-assigned id.
    async fn insert(&self, name: &str, storage_path: &StorageKey) -> GatewayResult<DocumentId>;

    /// Apply a partial update to the record's mutable fields.
    async fn update(&self, id: DocumentId, patch: RecordPatch) -> GatewayResult<()>;

    /// Delete the record.
    async fn delete(&self, id: DocumentId) -> GatewayResult<()>;
}

/// on-disk catalog format
///
/// ids are assigned from `next_id` and never reused, records keep insertion
/// order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogFile {
    next_id: i64,
    records: Vec<DocumentRecord>,
}

/// Record store persisted as one JSON document on disk.
///
/// State is held in memory and flushed after every mutation, so reads never
/// touch the disk and a reopened store sees everything that was committed.
#[derive(Debug, Clone)]
pub struct JsonMetadata {
    path: PathBuf,
    state: Arc<RwLock<CatalogFile>>,
    flush_lock: Arc<Mutex<()>>,
}

impl JsonMetadata {
    /// File name of the catalog inside a shelf directory.
    pub const CATALOG_FILE: &'static str = "documents.json";

    /// Open or create a catalog at the given file path.
    pub fn open(path: impl AsRef<Path>) -> GatewayResult<Self> {
        let path = path.as_ref().to_path_buf();

        let state = if path.exists() {
            let bytes = std::fs::read(&path)?;
            serde_json::from_slice(&bytes)?
        } else {
            CatalogFile {
                next_id: 1,
                records: Vec::new(),
            }
        };

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(state)),
            flush_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Write the current state to disk.
    ///
    /// Flushes are serialized through `flush_lock`, with the snapshot taken
    /// under that same lock; a flush for an earlier mutation can therefore
    /// never land on disk after one that already includes it. The bytes go
    /// through a temp file and a rename, so the catalog on disk is always a
    /// complete document.
    async fn flush(&self) -> GatewayResult<()> {
        let _guard = self.flush_lock.lock().await;
        let snapshot = self.state.read().clone();
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl MetadataGateway for JsonMetadata {
    fn provider_name(&self) -> &'static str {
        "json"
    }

    async fn list(&self) -> GatewayResult<Vec<DocumentListEntry>> {
        let state = self.state.read();
        Ok(state.records.iter().map(DocumentListEntry::from).collect())
    }

    async fn insert(&self, name: &str, storage_path: &StorageKey) -> GatewayResult<DocumentId> {
        let id = {
            let mut state = self.state.write();
            let id = DocumentId::new(state.next_id);
            state.next_id += 1;
            state.records.push(DocumentRecord {
                id,
                name: name.to_string(),
                storage_path: storage_path.clone(),
                created_at: chrono::Utc::now(),
            });
            id
        };
        self.flush().await?;
        tracing::debug!(%id, name, path = %storage_path, "record inserted");
        Ok(id)
    }

    async fn update(&self, id: DocumentId, patch: RecordPatch) -> GatewayResult<()> {
        {
            let mut state = self.state.write();
            let record = state
                .records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(GatewayError::RecordNotFound(id))?;
            if let Some(name) = patch.name {
                record.name = name;
            }
        }
        self.flush().await?;
        Ok(())
    }

    async fn delete(&self, id: DocumentId) -> GatewayResult<()> {
        {
            let mut state = self.state.write();
            let before = state.records.len();
            state.records.retain(|r| r.id != id);
            if state.records.len() == before {
                return Err(GatewayError::RecordNotFound(id));
            }
        }
        self.flush().await?;
        tracing::debug!(%id, "record deleted");
        Ok(())
    }
}

/// In-memory record store for embedding and tests.
#[derive(Debug, Default)]
struct MemoryCatalog {
    next_id: i64,
    order: Vec<DocumentId>,
    records: HashMap<DocumentId, DocumentRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryMetadata {
    state: Arc<RwLock<MemoryCatalog>>,
}

impl MemoryMetadata {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryCatalog {
                next_id: 1,
                ..Default::default()
            })),
        }
    }

    /// number of live records
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().records.is_empty()
    }
}

#[async_trait]
impl MetadataGateway for MemoryMetadata {
    fn provider_name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> GatewayResult<Vec<DocumentListEntry>> {
        let state = self.state.read();
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.records.get(id))
            .map(DocumentListEntry::from)
            .collect())
    }

    async fn insert(&self, name: &str, storage_path: &StorageKey) -> GatewayResult<DocumentId> {
        let mut state = self.state.write();
        let id = DocumentId::new(state.next_id);
        state.next_id += 1;
        state.order.push(id);
        state.records.insert(
            id,
            DocumentRecord {
                id,
                name: name.to_string(),
                storage_path: storage_path.clone(),
                created_at: chrono::Utc::now(),
            },
        );
        Ok(id)
    }

    async fn update(&self, id: DocumentId, patch: RecordPatch) -> GatewayResult<()> {
        let mut state = self.state.write();
        let record = state
            .records
            .get_mut(&id)
            .ok_or(GatewayError::RecordNotFound(id))?;
        if let Some(name) = patch.name {
            record.name = name;
        }
        Ok(())
    }

    async fn delete(&self, id: DocumentId) -> GatewayResult<()> {
        let mut state = self.state.write();
        state
            .records
            .remove(&id)
            .ok_or(GatewayError::RecordNotFound(id))?;
        state.order.retain(|other| *other != id);
        Ok(())
    }
}
