//! Document list caching.
//!
//! Holds the single shared snapshot the viewer navigator indexes into.
//! Invalidation is triggered exclusively by the coordinator's success paths;
//! there is no optimistic local mutation, so the cache can never diverge
//! from the record store beyond one refresh.

mod list;

pub use list::DocumentListCache;
