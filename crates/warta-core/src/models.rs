//! Domain models
//!
//! Records as the backend returns them. The backend is a JSON REST API
//! with loosely typed payloads: ids arrive as numbers or strings depending
//! on the endpoint, and optional fields come and go. Deserialization is
//! deliberately lenient where the source payloads are.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One message exchanged between two participants.
///
/// `id` and `created_at` are server-assigned on persisted records. An
/// optimistic record synthesized by the send path carries a [`crate::ClientMsgId`]
/// string as `id` and the local clock as `created_at` until the next
/// authoritative refresh reconciles it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Record id (server-assigned, or a client placeholder)
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    /// Sender identifier (email)
    pub sender: String,
    /// Recipient identifier (email)
    pub to: String,
    /// Text body
    pub message: String,
    /// RFC 3339 UTC timestamp
    pub created_at: String,
}

impl Message {
    /// Sort messages ascending by `created_at`.
    ///
    /// Stable: records with equal timestamps keep their fetch order.
    /// RFC 3339 strings compare lexicographically in chronological order.
    pub fn sort_chronological(messages: &mut [Message]) {
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    }
}

/// The authenticated account, as returned by `GET /user`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account id
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Email, the identity used on the messaging endpoints
    pub email: String,
    /// Account role (Wartawan, Narasumber, ...)
    #[serde(default)]
    pub role: Option<String>,
    /// Media outlet the account belongs to
    #[serde(default)]
    pub media: Option<String>,
}

/// One row of the messages overview: a peer plus the latest exchanged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Row id
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    /// Peer display name
    pub name: String,
    /// Sender identifier of the latest message
    #[serde(default)]
    pub sender: Option<String>,
    /// Recipient identifier of the latest message
    #[serde(default)]
    pub to: Option<String>,
    /// Latest message body, if any message has been exchanged
    #[serde(default)]
    pub latest_message: Option<String>,
    /// Timestamp of the latest message
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A contact from the directory (`GET /get-users`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Account id
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Email, used to open a conversation
    pub email: String,
    /// Account role
    #[serde(default)]
    pub role: Option<String>,
    /// Media outlet
    #[serde(default)]
    pub media: Option<String>,
    /// Free-form location
    #[serde(default)]
    pub location: Option<String>,
    /// Avatar URL
    #[serde(default)]
    pub image: Option<String>,
}

/// An article category (`GET /category-name`), used by the authoring picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Record id
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    /// Category name
    pub name: String,
}

/// A news article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Record id
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    /// URL slug, the key for detail and update endpoints
    #[serde(default)]
    pub slug: String,
    /// Headline
    pub title: String,
    /// Category name
    #[serde(default)]
    pub category: Option<String>,
    /// Body text
    #[serde(default)]
    pub content: Option<String>,
    /// Cover image URL
    #[serde(default)]
    pub image_url: Option<String>,
    /// Publication timestamp
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Accept ids serialized as either a JSON number or a string.
fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn message_accepts_numeric_id() {
        let msg: Message = serde_json::from_str(
            r#"{"id": 42, "sender": "a@x.com", "to": "b@x.com",
                "message": "hi", "created_at": "2025-01-01T00:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(msg.id, "42");
    }

    #[test]
    fn message_accepts_string_id() {
        let msg: Message = serde_json::from_str(
            r#"{"id": "abc", "sender": "a@x.com", "to": "b@x.com",
                "message": "hi", "created_at": "2025-01-01T00:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(msg.id, "abc");
    }

    #[test]
    fn sort_chronological_orders_by_created_at() {
        let mut messages = vec![
            message("2", "2025-01-02T00:00:00.000Z"),
            message("1", "2025-01-01T00:00:00.000Z"),
            message("3", "2025-01-03T00:00:00.000Z"),
        ];
        Message::sort_chronological(&mut messages);
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn sort_chronological_is_stable_on_ties() {
        let mut messages = vec![
            message("first", "2025-01-01T00:00:00.000Z"),
            message("second", "2025-01-01T00:00:00.000Z"),
        ];
        Message::sort_chronological(&mut messages);
        assert_eq!(messages[0].id, "first");
        assert_eq!(messages[1].id, "second");
    }

    #[test]
    fn user_tolerates_missing_optional_fields() {
        let user: User =
            serde_json::from_str(r#"{"id": 1, "name": "Ani", "email": "ani@x.com"}"#).unwrap();
        assert_eq!(user.role, None);
        assert_eq!(user.media, None);
    }

    fn message(id: &str, created_at: &str) -> Message {
        Message {
            id: id.to_string(),
            sender: "a@x.com".to_string(),
            to: "b@x.com".to_string(),
            message: "hi".to_string(),
            created_at: created_at.to_string(),
        }
    }
}
