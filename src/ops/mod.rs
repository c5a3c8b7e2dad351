//! File operations coordination.
//!
//! This module implements the synchronization layer between the blob store
//! and the record store. Every logical operation (create, upload, update,
//! delete) runs its blob step to completion before its record step, reports
//! a single outcome, and refreshes the list cache on success.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     FileOperations                          │
//! │   (two-phase blob/record sequencing, one outcome per op)    │
//! └─────────────────────────────────────────────────────────────┘
//!        │                 │                   │
//!        ▼                 ▼                   ▼
//!  ┌───────────┐    ┌─────────────┐     ┌─────────────┐
//!  │ gateways  │    │  list cache │     │  Notifier / │
//!  │ (2 stores)│    │  (refresh)  │     │ Confirmation│
//!  └───────────┘    └─────────────┘     └─────────────┘
//! ```
//!
//! There is no distributed transaction across the two stores. Partial
//! failures leave exactly one documented orphan kind per operation (see
//! [`FileOperations`]) and are reported, never silently absorbed.

mod coordinator;
mod error;
mod notify;

pub use coordinator::{FileOperations, UploadReport};
pub use error::{OpError, OpResult};
pub use notify::{AutoConfirm, Confirmation, LogNotifier, Notification, Notifier, Severity};
