//! On-disk session persistence.
//!
//! The CLI keeps its session in a small JSON file between runs. A missing
//! file is simply "not signed in".

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::context::Session;

/// Default session file, relative to the working directory.
const DEFAULT_PATH: &str = ".trip-session.json";

/// Errors reading or writing the session file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON file holding a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the stored session. `Ok(None)` when no file exists.
    pub fn load(&self) -> Result<Option<Session>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session = serde_json::from_str(&contents)?;
        debug!(path = %self.path.display(), "loaded session");
        Ok(Some(session))
    }

    /// Write the session, creating parent directories if needed.
    pub fn save(&self, session: &Session) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Remove the session file. Removing a missing file is not an error.
    pub fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{AccessToken, User};
    use tempfile::tempdir;

    fn session() -> Session {
        Session {
            access_token: Some(AccessToken::new("abc.def.ghi")),
            user: Some(User {
                id: 3,
                email: "x@example.com".into(),
                nickname: None,
            }),
            cookies: Some("refresh_token=r1".into()),
        }
    }

    #[test]
    fn save_and_load() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        store.save(&session()).unwrap();
        assert_eq!(store.load().unwrap(), Some(session()));
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nope.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn invalid_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let err = SessionStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("a/b/session.json"));
        store.save(&Session::default()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn clear_removes_file() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(&session()).unwrap();

        store.clear().unwrap();
        assert!(!store.path().exists());
        // Idempotent.
        store.clear().unwrap();
    }

    #[test]
    fn empty_session_serializes_compactly() {
        let json = serde_json::to_string(&Session::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
