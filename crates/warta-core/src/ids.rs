//! Client-side identifiers
//!
//! Optimistic message records need a stable identity before the server has
//! assigned one. `ClientMsgId` is that placeholder: generated locally,
//! rendered in place of the server id, and discarded once the record is
//! reconciled against an authoritative fetch.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable temporary identity for an optimistic message record (UUID v4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientMsgId(pub Uuid);

impl ClientMsgId {
    /// Generate a new client message ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientMsgId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientMsgId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
