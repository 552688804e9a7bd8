//! HTTP DTOs for the backend REST API
//!
//! Request and response shapes as the wire carries them. List responses
//! wrap their payload in a `data` field that is not always an array when
//! the backend errors halfway; those deserialize to an empty list rather
//! than failing the whole response.

use crate::models::{Article, Category, Contact, Message, User};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// Login

/// `POST /login` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

/// `POST /login` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token to persist under the fixed storage key
    pub access_token: String,
    /// The authenticated account
    pub user: User,
}

// Register

/// `POST /register` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Display name
    pub name: String,
    /// Account role
    pub role: String,
    /// Media outlet
    pub media: String,
    /// Email (lowercased by the caller, as the source app does)
    pub email: String,
    /// Password
    pub password: String,
    /// Password confirmation, must equal `password`
    pub password_confirmation: String,
}

// Messaging

/// `POST /messages/post` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessageRequest {
    /// Sender identifier (server-resolved, never route-supplied)
    pub sender: String,
    /// Recipient identifier
    pub to: String,
    /// Text body
    pub message: String,
}

/// `GET /messages/{sender}/{to}` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageListResponse {
    /// Full message history for the conversation
    #[serde(default, deserialize_with = "lenient_list")]
    pub data: Vec<Message>,
}

/// `GET /get-users` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactListResponse {
    /// Matching contacts
    #[serde(default, deserialize_with = "lenient_list")]
    pub data: Vec<Contact>,
}

// News

/// Response shape shared by the news list endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsListResponse {
    /// Articles
    #[serde(default, deserialize_with = "lenient_list")]
    pub data: Vec<Article>,
}

/// `GET /category-name` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryListResponse {
    /// Available article categories
    #[serde(default, deserialize_with = "lenient_list")]
    pub data: Vec<Category>,
}

/// `GET /news-details/{slug}` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsDetailsResponse {
    /// The article, absent when the slug is unknown
    #[serde(default)]
    pub data: Option<Article>,
}

/// Body for `POST /post-berita` and `POST /update-berita/{slug}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDraft {
    /// Headline (backend field name)
    pub judul_berita: String,
    /// Category name
    pub category: String,
    /// Body text
    pub content: String,
}

// Errors

/// Error body the backend attaches to non-success responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
}

/// Deserialize a `data` field that should be an array but may not be.
///
/// Missing, null, or non-array payloads become an empty list; elements
/// that fail to parse are skipped. Mirrors the source client's
/// `Array.isArray(data) ? data : []` guard.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        Some(Value::Array(items)) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_list_parses_array_payload() {
        let resp: MessageListResponse = serde_json::from_str(
            r#"{"data": [{"id": 1, "sender": "a@x.com", "to": "b@x.com",
                 "message": "hi", "created_at": "2025-01-01T00:00:00.000Z"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.data.len(), 1);
        assert_eq!(resp.data[0].message, "hi");
    }

    #[test]
    fn message_list_tolerates_non_array_payload() {
        let resp: MessageListResponse =
            serde_json::from_str(r#"{"data": "unexpected"}"#).unwrap();
        assert!(resp.data.is_empty());
    }

    #[test]
    fn message_list_tolerates_missing_payload() {
        let resp: MessageListResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(resp.data.is_empty());

        let resp: MessageListResponse = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(resp.data.is_empty());
    }

    #[test]
    fn message_list_skips_malformed_elements() {
        let resp: MessageListResponse = serde_json::from_str(
            r#"{"data": [{"bogus": true},
                 {"id": 2, "sender": "a@x.com", "to": "b@x.com",
                  "message": "ok", "created_at": "2025-01-01T00:00:00.000Z"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.data.len(), 1);
        assert_eq!(resp.data[0].id, "2");
    }

    #[test]
    fn login_response_round_trips() {
        let json = r#"{"access_token": "tok", "user":
            {"id": 7, "name": "Ani", "email": "ani@x.com"}}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "tok");
        assert_eq!(resp.user.email, "ani@x.com");
    }
}
