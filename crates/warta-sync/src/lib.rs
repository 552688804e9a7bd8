//! Warta Sync - the chat synchronization engine
//!
//! Keeps one conversation's message list current against the backend:
//! - **Polling driver**: fetch immediately on open, then at a fixed
//!   interval until shutdown; single-flight, stale responses discarded
//! - **Fetch-and-merge**: sort by `created_at`, replace the store only
//!   when the serialized list actually changed
//! - **Send path**: post, then append an optimistic record that is
//!   reconciled against the next authoritative refresh
//!
//! Unlike the screens this engine descends from, a failed fetch never
//! blanks the view: the store keeps the last known-good list and the
//! failure is reported as an event.

#![warn(unreachable_pub)]

pub mod config;
pub mod engine;
pub mod store;

// Re-exports for convenience
pub use config::SyncConfig;
pub use engine::{ConversationSync, SyncError, SyncEvent};
pub use store::{MessageStore, StoreSnapshot};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
