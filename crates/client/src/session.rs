//! Saved session for command-line use
//!
//! The CLI logs in once and reuses the backend's session cookie on later
//! invocations. The cookie value and the user it belongs to are kept in
//! `<config dir>/taskboard/session.json`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::config_dir;
use crate::error::{ClientError, ClientResult};
use crate::models::User;

/// Session cookie plus the user it authenticates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSession {
    pub token: String,
    pub user: User,
}

/// File-backed storage for a `SavedSession`
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform config directory, if one exists.
    pub fn default_location() -> Option<Self> {
        config_dir().map(|dir| Self::new(dir.join("session.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved session. A missing file means no session.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Io` if the file exists but cannot be read, or
    /// `ClientError::Decode` if it is not a valid session file.
    pub fn load(&self) -> ClientResult<Option<SavedSession>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let session = serde_json::from_str(&contents).map_err(|e| ClientError::Decode {
            url: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Some(session))
    }

    /// Write the session, creating the directory if needed.
    pub fn save(&self, session: &SavedSession) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_string_pretty(session).map_err(|e| ClientError::Decode {
            url: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Remove the saved session. Removing a missing file is not an error.
    pub fn clear(&self) -> ClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> ClientError {
        ClientError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn temp_store(name: &str) -> SessionStore {
        let dir = std::env::temp_dir().join(format!(
            "taskboard-session-{}-{}",
            name,
            std::process::id()
        ));
        SessionStore::new(dir.join("session.json"))
    }

    #[test]
    fn test_missing_file_is_none() {
        let store = temp_store("missing");
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_load_clear() {
        let store = temp_store("cycle");
        let session = SavedSession {
            token: "abc".to_string(),
            user: User::new("u1", "a@b.io").with_role(Role::Admin),
        };
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();

        if let Some(dir) = store.path().parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_corrupt_file_is_decode_error() {
        let store = temp_store("corrupt");
        if let Some(dir) = store.path().parent() {
            fs::create_dir_all(dir).unwrap();
        }
        fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.load(), Err(ClientError::Decode { .. })));
        store.clear().unwrap();
    }
}
