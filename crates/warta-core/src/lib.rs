//! Warta Core - shared types
//!
//! Defines the types every other crate in the workspace speaks:
//! - Domain models (messages, users, conversations, articles)
//! - HTTP DTOs for the backend REST API
//! - Client-side identifiers for optimistic records
//! - Timestamp helpers

#![warn(unreachable_pub)]

pub mod dto;
pub mod ids;
pub mod models;
pub mod time;

// Re-exports for convenience
pub use dto::{
    ArticleDraft, CategoryListResponse, ContactListResponse, ErrorBody, LoginRequest,
    LoginResponse, MessageListResponse, NewMessageRequest, NewsDetailsResponse, NewsListResponse,
    RegisterRequest,
};
pub use ids::ClientMsgId;
pub use models::{Article, Category, Contact, ConversationSummary, Message, User};
pub use time::now_timestamp;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
