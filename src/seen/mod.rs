//! Seen-state persistence.
//!
//! Tracks which overlay identifiers have already been displayed so show-once
//! overlays are not presented again.

pub mod document;
pub mod store;

// Re-exports for convenience
pub use document::{DocumentSeenStore, SeenDocument};
pub use store::{MemorySeenStore, SeenStore, SharedSeenStore};
