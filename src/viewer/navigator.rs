//! The viewer navigation state machine.

use std::sync::Arc;

use crate::cache::DocumentListCache;
use crate::gateway::DocumentListEntry;
use crate::ops::{Confirmation, FileOperations};

/// Which document, among the current list, is open.
///
/// Transient and UI-local; never persisted. The index always refers to the
/// list cache's *current* snapshot, so it can go stale when another actor
/// mutates the list, so every transition re-resolves it before acting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerState {
    /// no document open
    Closed,
    /// document `index` open read-only with its loaded content
    Viewing { index: usize, content: String },
    /// document `index` open with an in-progress draft
    Editing {
        index: usize,
        content: String,
        draft: String,
    },
}

impl ViewerState {
    /// the open document's index, if any
    pub fn index(&self) -> Option<usize> {
        match self {
            ViewerState::Closed => None,
            ViewerState::Viewing { index, .. } | ViewerState::Editing { index, .. } => Some(*index),
        }
    }
}

/// State machine stepping through the cached document list.
///
/// Because the underlying list can change between selection and navigation,
/// `next`/`previous` always re-resolve against the current cache length at
/// the moment of the transition; an index that became out-of-bounds after a
/// concurrent deletion clamps to `Closed` instead of indexing out of range.
/// Loads that complete after the list moved underneath them are discarded
/// (the guard compares the entry id captured at selection time against the
/// id at the same index afterwards).
pub struct Navigator {
    ops: Arc<FileOperations>,
    cache: Arc<DocumentListCache>,
    state: ViewerState,
}

impl Navigator {
    pub fn new(ops: Arc<FileOperations>, cache: Arc<DocumentListCache>) -> Self {
        Self {
            ops,
            cache,
            state: ViewerState::Closed,
        }
    }

    /// current state of the machine
    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, ViewerState::Closed)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, ViewerState::Editing { .. })
    }

    /// the open document's loaded content (the draft, while editing, lives
    /// in [`draft`](Self::draft))
    pub fn content(&self) -> Option<&str> {
        match &self.state {
            ViewerState::Closed => None,
            ViewerState::Viewing { content, .. } | ViewerState::Editing { content, .. } => {
                Some(content)
            }
        }
    }

    /// the in-progress draft, while editing
    pub fn draft(&self) -> Option<&str> {
        match &self.state {
            ViewerState::Editing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// the list entry the machine currently points at, re-resolved against
    /// the current cache
    pub fn current_entry(&self) -> Option<DocumentListEntry> {
        self.state.index().and_then(|i| self.cache.entry(i))
    }

    /// whether the "next" affordance should be enabled
    pub fn has_next(&self) -> bool {
        match self.state.index() {
            Some(index) => index + 1 < self.cache.len(),
            None => false,
        }
    }

    /// whether the "previous" affordance should be enabled
    pub fn has_previous(&self) -> bool {
        match self.state.index() {
            Some(index) => index > 0 && index < self.cache.len(),
            None => false,
        }
    }

    /// Open the document at `index`, loading its content.
    ///
    /// On load failure the machine stays (or becomes) `Closed` and the
    /// error surfaces through the coordinator's notifier. A load whose
    /// entry no longer sits at `index` once it completes is discarded.
    pub async fn select(&mut self, index: usize) -> bool {
        let Some(entry) = self.cache.entry(index) else {
            self.state = ViewerState::Closed;
            return false;
        };

        let Some(bytes) = self.ops.load(&entry.storage_path).await else {
            self.state = ViewerState::Closed;
            return false;
        };

        // stale-response guard keyed by the originating entry identity
        match self.cache.entry(index) {
            Some(current) if current.id == entry.id => {
                self.state = ViewerState::Viewing {
                    index,
                    content: String::from_utf8_lossy(&bytes).into_owned(),
                };
                true
            }
            _ => {
                tracing::debug!(index, "discarding stale load; list changed in flight");
                self.state = ViewerState::Closed;
                false
            }
        }
    }

    /// Step to the next document. No-op at the end of the list; closes if
    /// the current index fell out of bounds.
    pub async fn next(&mut self) -> bool {
        let ViewerState::Viewing { index, .. } = self.state else {
            return false;
        };

        let len = self.cache.len();
        if index >= len {
            // the entry under us was deleted
            self.state = ViewerState::Closed;
            return false;
        }
        if index + 1 >= len {
            return false;
        }
        self.select(index + 1).await
    }

    /// Step to the previous document. No-op at index 0; closes if the
    /// current index fell out of bounds.
    pub async fn previous(&mut self) -> bool {
        let ViewerState::Viewing { index, .. } = self.state else {
            return false;
        };

        let len = self.cache.len();
        if index >= len {
            self.state = ViewerState::Closed;
            return false;
        }
        if index == 0 {
            return false;
        }
        self.select(index - 1).await
    }

    /// Begin editing, seeding the draft with the loaded content.
    pub fn edit(&mut self) -> bool {
        if let ViewerState::Viewing { index, content } = &self.state {
            let (index, content) = (*index, content.clone());
            self.state = ViewerState::Editing {
                index,
                content: content.clone(),
                draft: content,
            };
            true
        } else {
            false
        }
    }

    /// Replace the draft text. Only meaningful while editing.
    pub fn replace_draft(&mut self, text: impl Into<String>) -> bool {
        if let ViewerState::Editing { draft, .. } = &mut self.state {
            *draft = text.into();
            true
        } else {
            false
        }
    }

    /// Save the draft through the coordinator's update operation.
    ///
    /// On success the machine returns to `Viewing` with the saved content;
    /// on failure it stays in `Editing` with the draft intact so no work is
    /// lost.
    pub async fn save(&mut self) -> bool {
        let ViewerState::Editing { index, draft, .. } = &self.state else {
            return false;
        };
        let index = *index;
        let draft = draft.clone();

        let Some(entry) = self.cache.entry(index) else {
            self.state = ViewerState::Closed;
            return false;
        };

        let saved = self
            .ops
            .update_content(
                entry.id,
                &entry.name,
                draft.as_bytes(),
                Some(&entry.storage_path),
            )
            .await;

        if saved {
            self.state = ViewerState::Viewing {
                index,
                content: draft,
            };
        }
        saved
    }

    /// Discard the draft and reload the original content.
    pub async fn cancel(&mut self) -> bool {
        if let ViewerState::Editing { index, .. } = self.state {
            self.select(index).await
        } else {
            false
        }
    }

    /// Delete the open document after confirmation. Closes on success,
    /// stays put on failure or a declined prompt.
    pub async fn delete(&mut self, confirm: &dyn Confirmation) -> bool {
        let ViewerState::Viewing { index, .. } = self.state else {
            return false;
        };
        let Some(entry) = self.cache.entry(index) else {
            self.state = ViewerState::Closed;
            return false;
        };

        if self.ops.delete(&entry, confirm).await {
            self.state = ViewerState::Closed;
            true
        } else {
            false
        }
    }

    /// Close the viewer from any state.
    pub fn close(&mut self) {
        self.state = ViewerState::Closed;
    }
}
