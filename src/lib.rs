//! docshelf - a markdown document shelf with split blob/metadata storage
//!
//! This crate keeps a document's content bytes (a blob in an object store)
//! and its metadata record (name, id, storage path in a record store)
//! consistent across create, upload, update and delete, and drives a small
//! viewer state machine for stepping through the document list while edits
//! are in flight.
//!
//! # Example
//!
//! ```no_run
//! use docshelf::shelf::Shelf;
//!
//! # async fn demo() {
//! let mut shelf = Shelf::open("./my_shelf").unwrap();
//! shelf.operations().create("notes.md", b"# Hi").await;
//! shelf.refresh().await.unwrap();
//! shelf.navigator().select(0).await;
//! # }
//! ```

pub mod cache;
pub mod gateway;
pub mod ops;
pub mod shelf;
pub mod viewer;
