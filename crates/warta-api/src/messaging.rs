//! Messaging endpoints
//!
//! The conversation overview, per-conversation history, sending, and the
//! contact directory. History fetches are what the sync engine polls; they
//! deserialize leniently (non-array payloads become an empty list) so a
//! half-broken backend response degrades instead of erroring.

use crate::client::ApiClient;
use crate::error::ApiError;
use serde_json::Value;
use warta_core::{
    Contact, ContactListResponse, ConversationSummary, Message, MessageListResponse,
    NewMessageRequest,
};

impl ApiClient {
    /// Conversation overview (`GET /messages`, bearer).
    ///
    /// One row per peer with the latest exchanged message.
    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ApiError> {
        self.get_json_auth("/messages").await
    }

    /// Full message history between two participants
    /// (`GET /messages/{sender}/{to}`).
    ///
    /// Returns the raw server order; callers sort. A non-array payload is
    /// an empty history, not an error.
    pub async fn list_messages(&self, sender: &str, to: &str) -> Result<Vec<Message>, ApiError> {
        let response: MessageListResponse = self
            .get_json(&format!("/messages/{sender}/{to}"))
            .await?;
        Ok(response.data)
    }

    /// Send a message (`POST /messages/post`).
    ///
    /// The created record's shape is not consumed beyond success/failure.
    pub async fn post_message(&self, request: &NewMessageRequest) -> Result<(), ApiError> {
        let _: Value = self.post_json("/messages/post", request).await?;
        Ok(())
    }

    /// Contact directory (`GET /get-users`, bearer), filtered by category
    /// and/or keyword. Empty filters list everyone.
    pub async fn list_contacts(
        &self,
        category: Option<&str>,
        keyword: Option<&str>,
    ) -> Result<Vec<Contact>, ApiError> {
        let query = [
            ("category", category.unwrap_or("")),
            ("keyword", keyword.unwrap_or("")),
        ];
        let response: ContactListResponse = self.get_json_auth_query("/get-users", &query).await?;
        Ok(response.data)
    }
}
