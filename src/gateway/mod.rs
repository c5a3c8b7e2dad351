//! gateway layer for docshelf
//!
//! this module provides the two thin adapters over the external stores. The
//! upper layers (coordinator, list cache, navigator) use these traits and
//! never touch a concrete backend directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  FileOperations (coordinator)               │
//! │      (sequences blob and record steps into one outcome)     │
//! └─────────────────────────────────────────────────────────────┘
//!                  │                           │
//!                  ▼                           ▼
//!        ┌──────────────────┐        ┌──────────────────┐
//!        │  StorageGateway  │        │ MetadataGateway  │
//!        │  (blob bytes)    │        │ (records, ids)   │
//!        └──────────────────┘        └──────────────────┘
//!                  │                           │
//!                  ▼                           ▼
//!           object store                 record store
//! ```
//!
//! Blobs are addressed by a [`StorageKey`] of the form
//! `{token}/{file_name}`; records carry the server-assigned [`DocumentId`]
//! and the denormalized storage path joined at list time.

mod error;
mod metadata;
mod storage;
mod types;

// Re-export public API
pub use error::{GatewayError, GatewayResult};
pub use metadata::{JsonMetadata, MemoryMetadata, MetadataGateway};
pub use storage::{FsStorage, MemoryStorage, StorageGateway};
pub use types::{
    DocumentId, DocumentListEntry, DocumentRecord, InvalidKeyError, RawFile, RecordPatch,
    StorageKey, MEDIA_TYPE,
};
