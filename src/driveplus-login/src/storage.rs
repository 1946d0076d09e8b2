//! Session storage backends.
//!
//! The session is a single record with three fields (`accessToken`,
//! `refreshToken`, `expiresAt`). Backends are initialized on demand: the
//! file backend creates its directory and file on the first save and treats
//! a missing file as an empty session.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::types::{Session, StoredSession};
use crate::utils::set_file_permissions;

/// Durable storage for the OAuth session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the stored session. A store with nothing saved yields an empty session.
    async fn load(&self) -> Result<Session, StoreError>;

    /// Overwrite the stored session.
    async fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Remove the stored session. Returns whether anything was removed.
    async fn clear(&self) -> Result<bool, StoreError>;

    /// Write a new access token and its expiry in one update, keeping the
    /// stored refresh token.
    async fn save_tokens(&self, access_token: &str, expires_at: i64) -> Result<(), StoreError> {
        let mut session = self.load().await?;
        session.set_access_token(access_token, expires_at);
        self.save(&session).await
    }
}

/// JSON file session store.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store the session at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store the session in `session.json` inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(driveplus_common::session_path(data_dir))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Session, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No session file, starting empty");
                return Ok(Session::default());
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Session::default());
        }

        let stored: StoredSession = serde_json::from_str(&content)?;
        Ok(Session::from_stored(stored))
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(&session.to_stored())?;

        // Write to a sibling temp file and rename so readers never see a torn record.
        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&tmp_path).await?;
        set_file_permissions(&tmp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp_path, &self.path).await?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    async fn clear(&self) -> Result<bool, StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "Session file removed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<StoredSession>,
}

impl MemorySessionStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `session`.
    pub fn with_session(session: &Session) -> Self {
        Self {
            inner: RwLock::new(session.to_stored()),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Session, StoreError> {
        let stored = self.inner.read().await;
        Ok(Session::from_stored(StoredSession {
            access_token: stored.access_token.clone(),
            refresh_token: stored.refresh_token.clone(),
            expires_at: stored.expires_at,
        }))
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        *self.inner.write().await = session.to_stored();
        Ok(())
    }

    async fn clear(&self) -> Result<bool, StoreError> {
        let mut stored = self.inner.write().await;
        let had_session = stored.access_token.is_some()
            || stored.refresh_token.is_some()
            || stored.expires_at.is_some();
        *stored = StoredSession::default();
        Ok(had_session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::in_dir(dir.path());
        let session = store.load().await.unwrap();
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_file_store_creates_directory_on_first_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::in_dir(&dir.path().join("nested").join("data"));

        let session = Session::new("access".to_string(), Some("refresh".to_string()), 42);
        store.save(&session).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.access_token(), Some("access"));
        assert_eq!(loaded.refresh_token(), Some("refresh"));
        assert_eq!(loaded.expires_at, Some(42));
    }

    #[tokio::test]
    async fn test_file_store_uses_storage_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::in_dir(dir.path());
        store
            .save(&Session::new("a".to_string(), Some("r".to_string()), 9))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["refreshToken"], "r");
        assert_eq!(json["expiresAt"], 9);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_store_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::in_dir(dir.path());
        store.save(&Session::new("a".to_string(), None, 1)).await.unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_save_tokens_keeps_refresh_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::in_dir(dir.path());
        store
            .save(&Session::new("old".to_string(), Some("refresh".to_string()), 1))
            .await
            .unwrap();

        store.save_tokens("new", 99).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.access_token(), Some("new"));
        assert_eq!(loaded.refresh_token(), Some("refresh"));
        assert_eq!(loaded.expires_at, Some(99));
    }

    #[tokio::test]
    async fn test_file_store_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::in_dir(dir.path());
        assert!(!store.clear().await.unwrap());

        store.save(&Session::new("a".to_string(), None, 1)).await.unwrap();
        assert!(store.clear().await.unwrap());
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::in_dir(dir.path());
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.load().await, Err(StoreError::Json(_))));
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemorySessionStore::new();
        assert!(store.load().await.unwrap().is_empty());

        store
            .save(&Session::new("a".to_string(), Some("r".to_string()), 3))
            .await
            .unwrap();
        store.save_tokens("b", 4).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.access_token(), Some("b"));
        assert_eq!(loaded.refresh_token(), Some("r"));
        assert!(store.clear().await.unwrap());
        assert!(!store.clear().await.unwrap());
    }
}
