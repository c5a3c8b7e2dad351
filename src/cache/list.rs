//! The document list cache.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::gateway::{DocumentListEntry, GatewayResult, MetadataGateway};

/// Cache of the most recently fetched ordered document list.
///
/// The snapshot is replaced wholesale on refresh; readers hold an
/// `Arc<Vec<_>>` and never observe a partially-updated sequence. The cache
/// performs no speculative local mutation; every change is confirmed by a
/// round trip through [`refresh`](Self::refresh), which the coordinator
/// drives from its success paths.
///
/// Each refresh bumps a generation counter on a watch channel; subscribing
/// to it is how observers learn the list was invalidated.
pub struct DocumentListCache {
    metadata: Arc<dyn MetadataGateway>,
    entries: RwLock<Arc<Vec<DocumentListEntry>>>,
    generation: watch::Sender<u64>,
}

impl DocumentListCache {
    /// Create an empty cache over the given record store.
    pub fn new(metadata: Arc<dyn MetadataGateway>) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            metadata,
            entries: RwLock::new(Arc::new(Vec::new())),
            generation,
        }
    }

    /// Refetch the list from the record store, replacing the snapshot
    /// atomically and bumping the generation signal.
    pub async fn refresh(&self) -> GatewayResult<()> {
        let fresh = self.metadata.list().await?;
        let len = fresh.len();
        *self.entries.write() = Arc::new(fresh);
        self.generation.send_modify(|g| *g += 1);
        tracing::debug!(entries = len, "document list refreshed");
        Ok(())
    }

    /// Read-only snapshot of the current list.
    pub fn current(&self) -> Arc<Vec<DocumentListEntry>> {
        self.entries.read().clone()
    }

    /// Number of entries in the current snapshot.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Entry at `index` in the current snapshot, if in bounds.
    pub fn entry(&self, index: usize) -> Option<DocumentListEntry> {
        self.entries.read().get(index).cloned()
    }

    /// Subscribe to the invalidation signal; the value is a generation
    /// counter that increments on every refresh.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }
}
