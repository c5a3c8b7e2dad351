//! The file operations coordinator.
//!
//! Each operation is a single logical unit from the caller's perspective
//! even though it performs one or two remote calls. Within an operation the
//! blob step is always awaited to completion before the dependent record
//! step begins; the second step's correctness depends on the first's
//! outcome. There is no shared transaction across the two stores, so each
//! operation documents which orphan a partial failure can leave behind.

use std::sync::Arc;

use futures_util::future::join_all;

use crate::cache::DocumentListCache;
use crate::gateway::{
    DocumentId, DocumentListEntry, MetadataGateway, RawFile, RecordPatch, StorageGateway,
    StorageKey, MEDIA_TYPE,
};
use crate::ops::error::{OpError, OpResult};
use crate::ops::notify::{Confirmation, Notification, Notifier};

/// Per-file outcome counts of a batch upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UploadReport {
    pub succeeded: usize,
    pub failed: usize,
}

impl UploadReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.succeeded > 0
    }
}

/// Coordinates create/upload/update/delete across the blob store and the
/// record store.
///
/// Gateway errors are caught here and never propagate past this boundary:
/// every public operation returns a plain outcome and reports the
/// human-readable reason through the notifier, so callers do not need their
/// own error handling. On every success path the document list cache is
/// refreshed, which is what broadcasts the invalidation signal.
pub struct FileOperations {
    storage: Arc<dyn StorageGateway>,
    metadata: Arc<dyn MetadataGateway>,
    cache: Arc<DocumentListCache>,
    notifier: Arc<dyn Notifier>,
}

impl FileOperations {
    pub fn new(
        storage: Arc<dyn StorageGateway>,
        metadata: Arc<dyn MetadataGateway>,
        cache: Arc<DocumentListCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            storage,
            metadata,
            cache,
            notifier,
        }
    }

    /// The cache this coordinator refreshes on success.
    pub fn cache(&self) -> &Arc<DocumentListCache> {
        &self.cache
    }

    /// Create a document: write the blob under a fresh key, then insert the
    /// record referencing it.
    ///
    /// If the blob write fails the operation aborts with no record created.
    /// If the record insert fails after the blob was written, the blob is
    /// left orphaned (accepted residual risk, logged, not rolled back) and
    /// the operation reports failure.
    pub async fn create(&self, name: &str, content: &[u8]) -> bool {
        match self.try_create(name, content).await {
            Ok(id) => {
                tracing::debug!(%id, name, "document created");
                self.refresh_after_success().await;
                self.notifier
                    .notify(Notification::info(format!("Created \"{}\".", name)));
                true
            }
            Err(e) => {
                self.notifier
                    .notify(Notification::error(format!("Error creating {}: {}", name, e)));
                false
            }
        }
    }

    /// Upload a batch of files, each evaluated independently and issued
    /// concurrently. Partial success is allowed; the report carries the
    /// counts. Failures notify per file; a summary notification and a cache
    /// refresh happen when at least one file made it.
    pub async fn upload(&self, files: Vec<RawFile>) -> UploadReport {
        let results = join_all(files.iter().map(|file| async move {
            match self.try_create(&file.name, &file.bytes).await {
                Ok(_) => true,
                Err(e) => {
                    self.notifier.notify(Notification::error(format!(
                        "Error uploading {}: {}",
                        file.name, e
                    )));
                    false
                }
            }
        }))
        .await;

        let succeeded = results.iter().filter(|ok| **ok).count();
        let failed = results.len() - succeeded;
        let report = UploadReport { succeeded, failed };

        if succeeded > 0 {
            self.refresh_after_success().await;
            let mut message = format!(
                "Successfully uploaded {} file{}",
                succeeded,
                if succeeded != 1 { "s" } else { "" }
            );
            if failed > 0 {
                message.push_str(&format!(". {} failed.", failed));
            }
            self.notifier.notify(Notification::info(message));
        }

        report
    }

    /// Replace a document's content in place and update its display name.
    ///
    /// Requires a storage path: an update with no addressable blob location
    /// fails fast with `InvalidState` before any gateway call. The blob is
    /// rewritten under the existing key (the key never changes), then the
    /// record's name is updated. If the blob write fails the name is not
    /// touched. If the record update fails after the blob write, the name
    /// stays stale while the content is already new (accepted residual
    /// inconsistency, logged).
    pub async fn update_content(
        &self,
        id: DocumentId,
        name: &str,
        new_content: &[u8],
        storage_path: Option<&StorageKey>,
    ) -> bool {
        match self.try_update(id, name, new_content, storage_path).await {
            Ok(()) => {
                self.refresh_after_success().await;
                self.notifier
                    .notify(Notification::info("File updated successfully."));
                true
            }
            Err(e) => {
                self.notifier.notify(Notification::error(format!(
                    "Failed to update file content: {}",
                    e
                )));
                false
            }
        }
    }

    /// Delete a document after interactive confirmation.
    ///
    /// Nothing happens remotely before the prompt answers yes. The record
    /// is deleted; the blob is deliberately retained: once no live record
    /// points at it, an orphaned blob costs storage, not correctness, and
    /// this crate applies that one policy consistently. If the record
    /// delete fails, the operation reports failure and nothing else
    /// happens.
    pub async fn delete(&self, entry: &DocumentListEntry, confirm: &dyn Confirmation) -> bool {
        match self.try_delete(entry, confirm).await {
            Ok(()) => {
                self.refresh_after_success().await;
                self.notifier
                    .notify(Notification::info("File deleted successfully."));
                true
            }
            Err(OpError::Cancelled) => {
                self.notifier
                    .notify(Notification::info("Deletion cancelled."));
                false
            }
            Err(e) => {
                self.notifier.notify(Notification::error(format!(
                    "Failed to delete document record: {}",
                    e
                )));
                false
            }
        }
    }

    /// Load a document's bytes for viewing.
    ///
    /// Failure notifies and yields `None`; like the mutating operations, no
    /// gateway error escapes this boundary.
    pub async fn load(&self, storage_path: &StorageKey) -> Option<Vec<u8>> {
        match self.storage.get(storage_path).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::debug!(key = %storage_path, error = %e, "blob load failed");
                self.notifier.notify(Notification::error(
                    "Failed to load file. Please try again.",
                ));
                None
            }
        }
    }

    async fn try_create(&self, name: &str, content: &[u8]) -> OpResult<DocumentId> {
        let key = StorageKey::generate(name);
        self.storage.put(&key, content, MEDIA_TYPE, false).await?;

        match self.metadata.insert(name, &key).await {
            Ok(id) => Ok(id),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "record insert failed after blob write; blob orphaned");
                Err(e.into())
            }
        }
    }

    async fn try_update(
        &self,
        id: DocumentId,
        name: &str,
        new_content: &[u8],
        storage_path: Option<&StorageKey>,
    ) -> OpResult<()> {
        let key = storage_path
            .ok_or_else(|| OpError::InvalidState("document has no storage path".into()))?;

        self.storage.put(key, new_content, MEDIA_TYPE, true).await?;

        match self.metadata.update(id, RecordPatch::rename(name)).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(%id, error = %e, "record update failed after blob write; name is stale");
                Err(e.into())
            }
        }
    }

    async fn try_delete(
        &self,
        entry: &DocumentListEntry,
        confirm: &dyn Confirmation,
    ) -> OpResult<()> {
        let prompt = format!("Are you sure you want to delete \"{}\"?", entry.name);
        if !confirm.confirm(&prompt).await {
            return Err(OpError::Cancelled);
        }

        self.metadata.delete(entry.id).await?;
        tracing::debug!(key = %entry.storage_path, "record deleted; blob retained");
        Ok(())
    }

    async fn refresh_after_success(&self) {
        if let Err(e) = self.cache.refresh().await {
            tracing::warn!(error = %e, "list refresh failed after successful operation");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::gateway::{GatewayError, GatewayResult, MemoryMetadata, MemoryStorage};
    use crate::ops::notify::{AutoConfirm, Severity};

    /// notifier that records everything it is told
    #[derive(Default)]
    struct RecordingNotifier {
        notes: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        fn messages(&self) -> Vec<Notification> {
            self.notes.lock().clone()
        }

        fn errors(&self) -> usize {
            self.notes
                .lock()
                .iter()
                .filter(|n| n.severity == Severity::Error)
                .count()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.notes.lock().push(notification);
        }
    }

    /// storage decorator that counts calls and can fail puts whose key ends
    /// with a given suffix
    struct FlakyStorage {
        inner: MemoryStorage,
        calls: AtomicUsize,
        deny_put_suffix: Option<String>,
    }

    impl FlakyStorage {
        fn new() -> Self {
            Self {
                inner: MemoryStorage::new(),
                calls: AtomicUsize::new(0),
                deny_put_suffix: None,
            }
        }

        fn deny_puts_ending_with(suffix: &str) -> Self {
            Self {
                deny_put_suffix: Some(suffix.to_string()),
                ..Self::new()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StorageGateway for FlakyStorage {
        fn provider_name(&self) -> &'static str {
            "flaky"
        }

        async fn put(
            &self,
            key: &StorageKey,
            bytes: &[u8],
            content_type: &str,
            overwrite: bool,
        ) -> GatewayResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(suffix) = &self.deny_put_suffix {
                if key.as_str().ends_with(suffix) {
                    return Err(GatewayError::Unavailable("injected put failure".into()));
                }
            }
            self.inner.put(key, bytes, content_type, overwrite).await
        }

        async fn get(&self, key: &StorageKey) -> GatewayResult<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get(key).await
        }

        async fn delete(&self, key: &StorageKey) -> GatewayResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.delete(key).await
        }
    }

    /// metadata decorator that counts calls and can fail selected operations
    struct FlakyMetadata {
        inner: MemoryMetadata,
        calls: AtomicUsize,
        fail_insert: bool,
        fail_update: bool,
        fail_delete: bool,
    }

    impl FlakyMetadata {
        fn new() -> Self {
            Self {
                inner: MemoryMetadata::new(),
                calls: AtomicUsize::new(0),
                fail_insert: false,
                fail_update: false,
                fail_delete: false,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn injected() -> GatewayError {
            GatewayError::Unavailable("injected record failure".into())
        }
    }

    #[async_trait]
    impl MetadataGateway for FlakyMetadata {
        fn provider_name(&self) -> &'static str {
            "flaky"
        }

        async fn list(&self) -> GatewayResult<Vec<DocumentListEntry>> {
            // listing is cache traffic, not an operation step; left uncounted
            self.inner.list().await
        }

        async fn insert(&self, name: &str, storage_path: &StorageKey) -> GatewayResult<DocumentId> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_insert {
                return Err(Self::injected());
            }
            self.inner.insert(name, storage_path).await
        }

        async fn update(&self, id: DocumentId, patch: RecordPatch) -> GatewayResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_update {
                return Err(Self::injected());
            }
            self.inner.update(id, patch).await
        }

        async fn delete(&self, id: DocumentId) -> GatewayResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_delete {
                return Err(Self::injected());
            }
            self.inner.delete(id).await
        }
    }

    /// confirmation with a fixed answer that counts how often it was asked
    struct FixedConfirm {
        answer: bool,
        asked: AtomicUsize,
    }

    impl FixedConfirm {
        fn new(answer: bool) -> Self {
            Self {
                answer,
                asked: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Confirmation for FixedConfirm {
        async fn confirm(&self, _message: &str) -> bool {
            self.asked.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    struct Harness {
        storage: Arc<FlakyStorage>,
        metadata: Arc<FlakyMetadata>,
        cache: Arc<DocumentListCache>,
        notifier: Arc<RecordingNotifier>,
        ops: FileOperations,
    }

    impl Harness {
        fn new(storage: FlakyStorage, metadata: FlakyMetadata) -> Self {
            let storage = Arc::new(storage);
            let metadata = Arc::new(metadata);
            let cache = Arc::new(DocumentListCache::new(metadata.clone()));
            let notifier = Arc::new(RecordingNotifier::default());
            let ops = FileOperations::new(
                storage.clone(),
                metadata.clone(),
                cache.clone(),
                notifier.clone(),
            );
            Self {
                storage,
                metadata,
                cache,
                notifier,
                ops,
            }
        }

        fn default() -> Self {
            Self::new(FlakyStorage::new(), FlakyMetadata::new())
        }
    }

    // create: blob first, record second

    #[tokio::test]
    async fn test_create_success_adds_exactly_one_resolvable_entry() {
        let h = Harness::default();

        assert!(h.ops.create("notes.md", b"# Hi").await);

        let list = h.metadata.list().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "notes.md");

        // storage path resolves to the written bytes
        let bytes = h.storage.get(&list[0].storage_path).await.unwrap();
        assert_eq!(bytes, b"# Hi");

        // cache was refreshed and one info notification surfaced
        assert_eq!(h.cache.len(), 1);
        assert_eq!(h.notifier.errors(), 0);
        assert_eq!(h.notifier.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_create_blob_failure_leaves_no_record() {
        let h = Harness::new(
            FlakyStorage::deny_puts_ending_with("notes.md"),
            FlakyMetadata::new(),
        );

        assert!(!h.ops.create("notes.md", b"# Hi").await);

        // list unchanged, record store never reached
        assert!(h.metadata.list().await.unwrap().is_empty());
        assert_eq!(h.metadata.calls(), 0);
        assert_eq!(h.notifier.errors(), 1);
    }

    #[tokio::test]
    async fn test_create_record_failure_leaves_orphan_blob_and_reports_failure() {
        let mut metadata = FlakyMetadata::new();
        metadata.fail_insert = true;
        let h = Harness::new(FlakyStorage::new(), metadata);

        assert!(!h.ops.create("notes.md", b"# Hi").await);

        // the blob made it, the record didn't: accepted orphan, failed outcome
        assert_eq!(h.storage.inner.len(), 1);
        assert!(h.metadata.list().await.unwrap().is_empty());
        assert_eq!(h.notifier.errors(), 1);
    }

    // update: same key, new bytes

    #[tokio::test]
    async fn test_update_preserves_key_and_renames() {
        let h = Harness::default();
        assert!(h.ops.create("notes.md", b"# Hi").await);
        let entry = h.cache.entry(0).unwrap();

        let ok = h
            .ops
            .update_content(
                entry.id,
                "renamed.md",
                b"# Hi there",
                Some(&entry.storage_path),
            )
            .await;
        assert!(ok);

        let list = h.metadata.list().await.unwrap();
        assert_eq!(list[0].storage_path, entry.storage_path);
        assert_eq!(list[0].name, "renamed.md");
        assert_eq!(
            h.storage.get(&entry.storage_path).await.unwrap(),
            b"# Hi there"
        );
    }

    #[tokio::test]
    async fn test_update_without_path_fails_fast() {
        let h = Harness::default();
        let storage_calls_before = h.storage.calls();
        let metadata_calls_before = h.metadata.calls();

        let ok = h
            .ops
            .update_content(DocumentId::new(1), "x.md", b"data", None)
            .await;

        assert!(!ok);
        // no gateway traffic at all
        assert_eq!(h.storage.calls(), storage_calls_before);
        assert_eq!(h.metadata.calls(), metadata_calls_before);
        assert_eq!(h.notifier.errors(), 1);
    }

    #[tokio::test]
    async fn test_update_blob_failure_keeps_name() {
        let h = Harness::default();
        assert!(h.ops.create("notes.md", b"old").await);
        let entry = h.cache.entry(0).unwrap();

        // make subsequent puts to this key fail
        let failing = Harness::new(
            FlakyStorage::deny_puts_ending_with("notes.md"),
            FlakyMetadata::new(),
        );
        let ops = FileOperations::new(
            failing.storage.clone(),
            h.metadata.clone(),
            h.cache.clone(),
            h.notifier.clone(),
        );

        let metadata_calls = h.metadata.calls();
        let ok = ops
            .update_content(entry.id, "renamed.md", b"new", Some(&entry.storage_path))
            .await;

        assert!(!ok);
        // record update never attempted, name unchanged
        assert_eq!(h.metadata.calls(), metadata_calls);
        assert_eq!(h.metadata.list().await.unwrap()[0].name, "notes.md");
    }

    #[tokio::test]
    async fn test_update_record_failure_reports_stale_name() {
        let mut metadata = FlakyMetadata::new();
        metadata.fail_update = true;
        let h = Harness::new(FlakyStorage::new(), metadata);

        let id = h
            .metadata
            .inner
            .insert("notes.md", &StorageKey::generate("notes.md"))
            .await
            .unwrap();
        let entry = {
            h.cache.refresh().await.unwrap();
            h.cache.entry(0).unwrap()
        };
        // seed the blob so overwrite has something to replace
        h.storage
            .put(&entry.storage_path, b"old", MEDIA_TYPE, true)
            .await
            .unwrap();

        let ok = h
            .ops
            .update_content(id, "renamed.md", b"new", Some(&entry.storage_path))
            .await;

        assert!(!ok);
        // content is new, name is stale: the accepted partial failure
        assert_eq!(h.storage.get(&entry.storage_path).await.unwrap(), b"new");
        assert_eq!(h.metadata.list().await.unwrap()[0].name, "notes.md");
        assert_eq!(h.notifier.errors(), 1);
    }

    // delete: nothing remote before the prompt

    #[tokio::test]
    async fn test_delete_declined_makes_zero_gateway_calls() {
        let h = Harness::default();
        assert!(h.ops.create("notes.md", b"# Hi").await);
        let entry = h.cache.entry(0).unwrap();

        let storage_calls = h.storage.calls();
        let metadata_calls = h.metadata.calls();
        let confirm = FixedConfirm::new(false);

        assert!(!h.ops.delete(&entry, &confirm).await);

        assert_eq!(confirm.asked.load(Ordering::SeqCst), 1);
        assert_eq!(h.storage.calls(), storage_calls);
        assert_eq!(h.metadata.calls(), metadata_calls);
        assert_eq!(h.metadata.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_confirmed_removes_record_and_keeps_blob() {
        let h = Harness::default();
        assert!(h.ops.create("notes.md", b"# Hi").await);
        let entry = h.cache.entry(0).unwrap();

        assert!(h.ops.delete(&entry, &AutoConfirm).await);

        assert!(h.metadata.list().await.unwrap().is_empty());
        assert_eq!(h.cache.len(), 0);
        // blob retained by policy
        assert!(h.storage.get(&entry.storage_path).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_record_failure_reports_and_changes_nothing() {
        let mut metadata = FlakyMetadata::new();
        metadata.fail_delete = true;
        let h = Harness::new(FlakyStorage::new(), metadata);

        assert!(h.ops.create("notes.md", b"# Hi").await);
        let entry = h.cache.entry(0).unwrap();

        assert!(!h.ops.delete(&entry, &AutoConfirm).await);

        assert_eq!(h.metadata.list().await.unwrap().len(), 1);
        assert_eq!(h.notifier.errors(), 1);
    }

    // batch upload

    #[tokio::test]
    async fn test_batch_upload_partial_success() {
        let h = Harness::new(
            FlakyStorage::deny_puts_ending_with("two.md"),
            FlakyMetadata::new(),
        );

        let report = h
            .ops
            .upload(vec![
                RawFile::new("one.md", b"1".as_slice()),
                RawFile::new("two.md", b"2".as_slice()),
                RawFile::new("three.md", b"3".as_slice()),
            ])
            .await;

        assert_eq!(report, UploadReport { succeeded: 2, failed: 1 });
        assert!(!report.all_succeeded());

        let names: Vec<String> = h
            .metadata
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"one.md".to_string()));
        assert!(names.contains(&"three.md".to_string()));

        // one error per failed file plus the summary
        assert_eq!(h.notifier.errors(), 1);
        let summary = h.notifier.messages().last().cloned().unwrap();
        assert!(summary.message.contains("2 files"));
        assert!(summary.message.contains("1 failed"));
    }

    #[tokio::test]
    async fn test_batch_upload_total_failure_skips_refresh() {
        let h = Harness::new(
            FlakyStorage::deny_puts_ending_with(".md"),
            FlakyMetadata::new(),
        );
        let rx = h.cache.subscribe();

        let report = h
            .ops
            .upload(vec![RawFile::new("a.md", b"a".as_slice())])
            .await;

        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failed, 1);
        // no success, no invalidation
        assert_eq!(*rx.borrow(), 0);
    }
}
