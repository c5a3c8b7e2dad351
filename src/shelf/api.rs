//! Shelf API - high-level interface for docshelf.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::cache::DocumentListCache;
use crate::gateway::{DocumentListEntry, FsStorage, GatewayError, JsonMetadata};
use crate::ops::{FileOperations, LogNotifier, Notifier};
use crate::viewer::Navigator;

/// Result type for shelf operations.
pub type ShelfResult<T> = Result<T, ShelfError>;

/// Shelf errors.
#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("shelf not found: {0}")]
    NotFound(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shelf configuration options.
#[derive(Debug, Clone)]
pub struct ShelfConfig {
    /// Path to the shelf directory.
    pub path: PathBuf,
    /// Create if doesn't exist.
    pub create_if_missing: bool,
    /// Enable verbose logging.
    pub verbose: bool,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".docshelf"),
            create_if_missing: true,
            verbose: false,
        }
    }
}

impl ShelfConfig {
    /// Create a new configuration with the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set create_if_missing flag.
    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Set verbose flag.
    pub fn verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }
}

/// The main shelf handle: filesystem-backed gateways, the shared list
/// cache, the coordinator, and one viewer navigator wired together.
///
/// Layout on disk:
///
/// ```text
/// <shelf>/
/// ├── documents.json   # record store
/// └── blobs/           # object store, one file per storage key
/// ```
pub struct Shelf {
    config: ShelfConfig,
    cache: Arc<DocumentListCache>,
    ops: Arc<FileOperations>,
    navigator: Navigator,
}

impl Shelf {
    /// Directory holding the blobs inside a shelf.
    pub const BLOBS_DIR: &'static str = "blobs";

    /// Open or create a shelf at the given path, logging outcomes via
    /// `tracing`.
    pub fn open(path: impl AsRef<Path>) -> ShelfResult<Self> {
        Self::open_with_config(ShelfConfig::new(path.as_ref()), Arc::new(LogNotifier))
    }

    /// Open or create a shelf with custom configuration and notifier.
    pub fn open_with_config(
        config: ShelfConfig,
        notifier: Arc<dyn Notifier>,
    ) -> ShelfResult<Self> {
        if !config.path.exists() && !config.create_if_missing {
            return Err(ShelfError::NotFound(config.path.clone()));
        }

        let storage = Arc::new(FsStorage::open(config.path.join(Self::BLOBS_DIR))?);
        let metadata = Arc::new(JsonMetadata::open(
            config.path.join(JsonMetadata::CATALOG_FILE),
        )?);

        let cache = Arc::new(DocumentListCache::new(metadata.clone()));
        let ops = Arc::new(FileOperations::new(
            storage,
            metadata,
            cache.clone(),
            notifier,
        ));
        let navigator = Navigator::new(ops.clone(), cache.clone());

        Ok(Self {
            config,
            cache,
            ops,
            navigator,
        })
    }

    /// The configuration this shelf was opened with.
    pub fn config(&self) -> &ShelfConfig {
        &self.config
    }

    /// The file operations coordinator.
    pub fn operations(&self) -> &Arc<FileOperations> {
        &self.ops
    }

    /// The shared document list cache.
    pub fn cache(&self) -> &Arc<DocumentListCache> {
        &self.cache
    }

    /// The viewer navigator.
    pub fn navigator(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    /// Refetch the document list from the record store.
    pub async fn refresh(&self) -> ShelfResult<()> {
        self.cache.refresh().await?;
        Ok(())
    }

    /// Snapshot of the current document list.
    pub fn entries(&self) -> Arc<Vec<DocumentListEntry>> {
        self.cache.current()
    }
}
