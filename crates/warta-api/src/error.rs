//! Error types for the REST client
//!
//! The taxonomy the client distinguishes:
//! - Transport failures (connection refused, timeout, DNS)
//! - Non-success HTTP status, with the server's message when it parses
//! - Malformed response payloads
//! - Missing authentication token
//! - Token store and configuration failures

use reqwest::StatusCode;

/// REST client error
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network / transport failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("server returned {status}{}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status {
        /// HTTP status code
        status: StatusCode,
        /// Server-provided message, when the error body parsed
        message: Option<String>,
    },

    /// Response body did not match the expected shape
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// An authenticated endpoint was called with no stored token
    #[error("no access token stored")]
    MissingToken,

    /// Token persistence failed
    #[error("token store error: {0}")]
    TokenStore(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Whether the retry policy applies to this error (HTTP 429 only)
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Status { status, .. } if *status == StatusCode::TOO_MANY_REQUESTS
        )
    }

    /// HTTP status code, when one was received
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_is_retryable() {
        let err = ApiError::Status {
            status: StatusCode::TOO_MANY_REQUESTS,
            message: None,
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn server_error_is_not_retryable() {
        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert!(!err.is_retryable());
        assert!(!ApiError::MissingToken.is_retryable());
    }

    #[test]
    fn status_display_includes_server_message() {
        let err = ApiError::Status {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: Some("email already taken".to_string()),
        };
        assert!(err.to_string().contains("email already taken"));
    }
}
