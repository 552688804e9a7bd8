//! Client configuration
//!
//! The base URL, request timeout, and 429 retry policy. The observed values
//! from the source client (10 s timeout, 3 retries at 2 s/4 s/8 s) are
//! defaults, not constants: nothing in the source justified them as
//! deliberate choices, so they stay tunable.

use crate::error::ApiError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Backoff policy for rate-limited (HTTP 429) requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum retry attempts after the initial request
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent one
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Policy that never retries
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (zero-based): `base * 2^attempt`
    #[inline]
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

/// REST client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Backend base URL, including the `/api` prefix
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// 429 backoff policy
    pub retry: RetryPolicy,
}

impl ApiConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With backend base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With per-request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// With retry policy
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Load configuration from a TOML file.
    ///
    /// All keys are optional; absent keys keep their defaults.
    ///
    /// ```toml
    /// base_url = "http://10.0.2.2:8000/api"
    /// request_timeout_secs = 10
    /// retry_max = 3
    /// retry_base_delay_ms = 2000
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ApiError::Config(format!("read config file: {e}")))?;
        let file: ConfigFile =
            toml::from_str(&raw).map_err(|e| ApiError::Config(format!("parse config: {e}")))?;

        let mut config = Self::default();
        if let Some(base_url) = file.base_url {
            config.base_url = base_url;
        }
        if let Some(secs) = file.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(max) = file.retry_max {
            config.retry.max_retries = max;
        }
        if let Some(ms) = file.retry_base_delay_ms {
            config.retry.base_delay = Duration::from_millis(ms);
        }
        Ok(config)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            request_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

/// On-disk shape of the config file
#[derive(Debug, Deserialize)]
struct ConfigFile {
    base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    retry_max: Option<u32>,
    retry_base_delay_ms: Option<u64>,
}
