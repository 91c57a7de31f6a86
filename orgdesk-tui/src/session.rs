//! Persisted admin session.
//!
//! The session file lets a restarted console skip the login screen. The
//! stored token is trusted until the backend rejects it, at which point
//! the store is cleared and the user is sent back to login.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use orgdesk_client::Session;
use shared::client::Admin;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Session payload written to disk.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub admin: Admin,
    pub logged_in_at: DateTime<Utc>,
}

impl StoredSession {
    /// Captures the active session for persistence.
    pub fn from_session(session: &Session) -> Self {
        Self {
            token: session.token.clone(),
            admin: session.admin.clone(),
            logged_in_at: Utc::now(),
        }
    }

    /// Rebuilds the client session from the stored payload.
    pub fn into_session(self) -> Session {
        Session::new(self.token, self.admin)
    }
}

/// File-backed store for the current session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    file_path: PathBuf,
}

impl SessionStore {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    /// Saves the session for later restoration.
    pub fn save(&self, session: &StoredSession) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.file_path, content)?;
        tracing::debug!(username = %session.admin.username, "Session saved");
        Ok(())
    }

    /// Loads the stored session, if any.
    pub fn load(&self) -> Result<Option<StoredSession>, SessionStoreError> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.file_path)?;
        let session: StoredSession = serde_json::from_str(&content)?;

        tracing::info!(username = %session.admin.username, "Loaded stored session");
        Ok(Some(session))
    }

    /// Removes the stored session.
    pub fn clear(&self) -> Result<(), SessionStoreError> {
        if self.file_path.exists() {
            std::fs::remove_file(&self.file_path)?;
            tracing::debug!("Session cleared");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_admin() -> Admin {
        Admin {
            id: "adm-1".to_string(),
            name: "Administrator".to_string(),
            username: "admin".to_string(),
            email: Some("admin@example.com".to_string()),
            phone: Some("081234567890".to_string()),
        }
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        let session = StoredSession {
            token: "tok-123".to_string(),
            admin: sample_admin(),
            logged_in_at: Utc::now(),
        };
        store.save(&session).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.token, "tok-123");
        assert_eq!(loaded.admin.username, "admin");
    }

    #[test]
    fn load_without_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn clear_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = SessionStore::new(&path);

        let session = StoredSession {
            token: "tok-123".to_string(),
            admin: sample_admin(),
            logged_in_at: Utc::now(),
        };
        store.save(&session).unwrap();
        assert!(path.exists());

        store.clear().unwrap();
        assert!(!path.exists());
        // Clearing twice is harmless
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_surfaces_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let store = SessionStore::new(&path);
        assert!(store.load().is_err());
    }
}
