//! Viewer navigation.
//!
//! An explicit state machine over the open-document selection. States:
//!
//! ```text
//!              select(i)                edit
//!   Closed ───────────────▶ Viewing ─────────▶ Editing
//!     ▲                      │   ▲               │  │
//!     │  delete / stale idx  │   │ save/cancel   │  │
//!     └──────────────────────┘   └───────────────┘  │
//!     ▲                                             │
//!     └───────────────── close (any state) ─────────┘
//! ```
//!
//! Transitions take the *current* list cache into account, so concurrent
//! deletions clamp the machine to `Closed` instead of indexing out of
//! bounds.

mod navigator;

pub use navigator::{Navigator, ViewerState};
