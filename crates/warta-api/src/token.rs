//! Bearer token persistence
//!
//! The app keeps one access token in local key-value storage under a fixed
//! key; it is read at startup to pick the initial route and attached as a
//! bearer header on authenticated requests. `TokenStore` is the seam the
//! host platform plugs its storage into; the file-backed implementation is
//! what the CLI uses, the in-memory one is for tests.

use crate::error::ApiError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Token persistence seam
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any
    fn load(&self) -> Result<Option<String>, ApiError>;

    /// Persist a token, replacing any previous one
    fn save(&self, token: &str) -> Result<(), ApiError>;

    /// Remove the stored token (logout)
    fn clear(&self) -> Result<(), ApiError>;
}

/// On-disk session record
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    access_token: String,
}

/// File-backed token store: one JSON file in a caller-chosen directory
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store writing to `<dir>/session.json`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join("session.json"),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, ApiError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| ApiError::TokenStore(e.to_string()))?;
        match serde_json::from_str::<StoredSession>(&raw) {
            Ok(session) => Ok(Some(session.access_token)),
            Err(e) => {
                // An unreadable session file means "not logged in", not a crash
                tracing::warn!(path = %self.path.display(), error = %e, "discarding corrupt session file");
                Ok(None)
            }
        }
    }

    fn save(&self, token: &str) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ApiError::TokenStore(e.to_string()))?;
        }
        let session = StoredSession {
            access_token: token.to_string(),
        };
        let raw = serde_json::to_string(&session)
            .map_err(|e| ApiError::TokenStore(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| ApiError::TokenStore(e.to_string()))
    }

    fn clear(&self) -> Result<(), ApiError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::TokenStore(e.to_string())),
        }
    }
}

/// In-memory token store for tests
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `token`
    #[must_use]
    pub fn preloaded(token: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, ApiError> {
        Ok(self.inner.lock().clone())
    }

    fn save(&self, token: &str) -> Result<(), ApiError> {
        *self.inner.lock() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        *self.inner.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());

        assert_eq!(store.load().unwrap(), None);
        store.save("tok-123").unwrap();
        assert_eq!(store.load().unwrap(), Some("tok-123".to_string()));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());
        store.clear().unwrap();
        store.clear().unwrap();
    }

    #[test]
    fn file_store_tolerates_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());
        std::fs::write(dir.path().join("session.json"), "not json").unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save("tok").unwrap();
        assert_eq!(store.load().unwrap(), Some("tok".to_string()));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
