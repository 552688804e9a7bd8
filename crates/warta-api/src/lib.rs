//! Warta API - REST client for the backend
//!
//! The typed face of the backend REST API:
//! - Session: login, register, logout, current-user resolution, initial route
//! - Messaging: conversation overview, message history, sending, contacts
//! - News: feeds, details, search, article authoring
//! - Plumbing: bearer-token persistence, request timeout, 429 retry policy
//!
//! All operations are async and return `Result<_, ApiError>`. The one piece
//! of resilience the client carries is the configurable exponential backoff
//! on HTTP 429; every other failure surfaces immediately for the caller to
//! decide on.

#![warn(unreachable_pub)]

pub mod client;
pub mod config;
pub mod error;
mod messaging;
mod news;
pub mod token;

// Re-exports for convenience
pub use client::{ApiClient, Route};
pub use config::{ApiConfig, RetryPolicy};
pub use error::ApiError;
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
