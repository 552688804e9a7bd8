//! Timestamp helpers
//!
//! The backend hands out RFC 3339 UTC strings for `created_at`.
//! Client-synthesized (optimistic) records use the same format so that
//! lexicographic comparison stays consistent with chronological order.

use chrono::{SecondsFormat, Utc};

/// Current UTC instant as an RFC 3339 string (millisecond precision)
#[must_use]
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
