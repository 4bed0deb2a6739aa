//! Durable session storage.
//!
//! One JSON file holding the current session triple, the desktop
//! analog of browser local storage.

use std::io;
use std::path::PathBuf;

use crate::error::ClientError;
use crate::models::Session;

/// File-backed session store.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store at an explicit path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the platform data directory
    /// (e.g. `~/.local/share/gatekey/session.json`).
    pub fn default_path() -> Self {
        let path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gatekey")
            .join("session.json");
        Self { path }
    }

    /// Load the persisted session, if any. A missing file is an empty
    /// store, not an error.
    pub fn load(&self) -> Result<Option<Session>, ClientError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session = serde_json::from_str(&contents)?;
        Ok(Some(session))
    }

    /// Persist the session, creating parent directories as needed.
    pub fn save(&self, session: &Session) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string(session)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Remove the persisted session. Clearing an empty store succeeds.
    pub fn clear(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionUser;

    fn sample_session() -> Session {
        Session {
            user: SessionUser {
                id: "user-1".into(),
                name: "Alice".into(),
                email: "alice@example.com".into(),
            },
            access_token: "access".into(),
            refresh_token: "refresh".into(),
        }
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().join("session.json"));
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn save_load_clear_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));

        store.save(&sample_session()).expect("save");
        let loaded = store.load().expect("load").expect("session");
        assert_eq!(loaded.user.email, "alice@example.com");
        assert_eq!(loaded.access_token, "access");

        store.clear().expect("clear");
        assert!(store.load().expect("load").is_none());
        // Clearing again is fine.
        store.clear().expect("clear twice");
    }
}
