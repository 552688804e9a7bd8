//! Sync engine configuration

use std::time::Duration;

/// Conversation polling configuration
///
/// The observed 3-second interval is a default, not a constant: the source
/// gave no rationale for it, so it stays a parameter. The 429 backoff lives
/// with the HTTP client ([`warta_api::RetryPolicy`]), not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Delay between poll cycles
    pub poll_interval: Duration,
}

impl SyncConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With poll interval
    #[inline]
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
        }
    }
}
