//! High-level shelf API and interactive browser.
//!
//! This module provides a clean, user-facing handle wiring together the
//! filesystem-backed gateways, the list cache, the coordinator and a viewer
//! navigator, plus the terminal browser loop the binary runs.

mod api;
mod repl;

pub use api::{Shelf, ShelfConfig, ShelfError, ShelfResult};
pub use repl::{Browser, BrowserConfig, ConsoleNotifier, StdinConfirm};
