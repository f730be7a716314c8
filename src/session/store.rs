//! Persistent session cache
//!
//! The cached token is only a fast-path seed; the profile is always
//! re-validated against the backend at boot. Corrupt cache files are
//! treated as absent rather than fatal.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::User;
use crate::shared::errors::{SessionError, SessionResult};

const TOKEN_FILE: &str = "auth_token";
const USER_FILE: &str = "auth_user.json";

/// Storage seam for the session cache.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn token(&self) -> SessionResult<Option<String>>;
    async fn set_token(&self, token: &str) -> SessionResult<()>;
    async fn clear_token(&self) -> SessionResult<()>;

    async fn user(&self) -> SessionResult<Option<User>>;
    async fn set_user(&self, user: &User) -> SessionResult<()>;
    async fn clear_user(&self) -> SessionResult<()>;
}

/// Filesystem-backed cache under the configured session directory.
pub struct FsSessionStore {
    dir: PathBuf,
}

impl FsSessionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    async fn ensure_dir(&self) -> SessionResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SessionError::Store(e.to_string()))
    }

    async fn read_optional(&self, file: &str) -> SessionResult<Option<String>> {
        match tokio::fs::read_to_string(self.path(file)).await {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SessionError::Store(e.to_string())),
        }
    }

    async fn remove_optional(&self, file: &str) -> SessionResult<()> {
        match tokio::fs::remove_file(self.path(file)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Store(e.to_string())),
        }
    }
}

#[async_trait]
impl SessionStore for FsSessionStore {
    async fn token(&self) -> SessionResult<Option<String>> {
        Ok(self
            .read_optional(TOKEN_FILE)
            .await?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()))
    }

    async fn set_token(&self, token: &str) -> SessionResult<()> {
        self.ensure_dir().await?;
        tokio::fs::write(self.path(TOKEN_FILE), token)
            .await
            .map_err(|e| SessionError::Store(e.to_string()))
    }

    async fn clear_token(&self) -> SessionResult<()> {
        self.remove_optional(TOKEN_FILE).await
    }

    async fn user(&self) -> SessionResult<Option<User>> {
        let raw = match self.read_optional(USER_FILE).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        // A cache that no longer parses is just a missing cache.
        Ok(serde_json::from_str(&raw).ok())
    }

    async fn set_user(&self, user: &User) -> SessionResult<()> {
        self.ensure_dir().await?;
        let json =
            serde_json::to_string(user).map_err(|e| SessionError::Store(e.to_string()))?;
        tokio::fs::write(self.path(USER_FILE), json)
            .await
            .map_err(|e| SessionError::Store(e.to_string()))
    }

    async fn clear_user(&self) -> SessionResult<()> {
        self.remove_optional(USER_FILE).await
    }
}

/// In-memory cache for tests.
#[derive(Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
    user: RwLock<Option<User>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::default();
        *store.token.write().unwrap() = Some(token.to_string());
        store
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn token(&self) -> SessionResult<Option<String>> {
        Ok(self.token.read().unwrap().clone())
    }

    async fn set_token(&self, token: &str) -> SessionResult<()> {
        *self.token.write().unwrap() = Some(token.to_string());
        Ok(())
    }

    async fn clear_token(&self) -> SessionResult<()> {
        *self.token.write().unwrap() = None;
        Ok(())
    }

    async fn user(&self) -> SessionResult<Option<User>> {
        Ok(self.user.read().unwrap().clone())
    }

    async fn set_user(&self, user: &User) -> SessionResult<()> {
        *self.user.write().unwrap() = Some(user.clone());
        Ok(())
    }

    async fn clear_user(&self) -> SessionResult<()> {
        *self.user.write().unwrap() = None;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────
