//! Where a client keeps its session between runs.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use hrdesk_core::result::AppResult;
use hrdesk_entity::Principal;
use hrdesk_entity::user::User;

/// What survives a restart: the token plus the user record and role as they
/// were last verified. Only the token is authoritative; the rest can be shown
/// before the token has been re-verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSession {
    /// Signed session token.
    pub token: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
    /// The signed-in user.
    pub user: User,
    /// Role resolved at the last sign-in or restore.
    pub principal: Principal,
}

/// Storage for a persisted session.
#[async_trait]
pub trait SessionPersistence: Send + Sync + 'static {
    /// Read the stored session, if any.
    async fn load(&self) -> AppResult<Option<PersistedSession>>;

    /// Replace the stored session.
    async fn save(&self, session: &PersistedSession) -> AppResult<()>;

    /// Remove the stored session. Clearing an empty store is not an error.
    async fn clear(&self) -> AppResult<()>;
}

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store the session at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionPersistence for FileSessionStore {
    async fn load(&self) -> AppResult<Option<PersistedSession>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session = serde_json::from_slice(&bytes)?;
        Ok(Some(session))
    }

    async fn save(&self, session: &PersistedSession) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&self.path, json).await?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps the session in memory only.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<PersistedSession>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionPersistence for MemorySessionStore {
    async fn load(&self) -> AppResult<Option<PersistedSession>> {
        Ok(self.slot.lock().await.clone())
    }

    async fn save(&self, session: &PersistedSession) -> AppResult<()> {
        *self.slot.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        *self.slot.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrdesk_entity::Role;
    use hrdesk_entity::user::UserStatus;
    use uuid::Uuid;

    fn sample() -> PersistedSession {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: "ola@firma.no".to_string(),
            password_hash: "100000:aa:bb".to_string(),
            full_name: Some("Ola Nordmann".to_string()),
            status: UserStatus::Active,
            failed_login_attempts: 0,
            locked_until: None,
            reset_token: None,
            reset_token_expires_at: None,
            last_login_at: Some(now),
            created_at: now,
            updated_at: now,
        };
        PersistedSession {
            token: "header.payload.signature".to_string(),
            expires_at: now,
            principal: Principal {
                user_id: user.id,
                email: user.email.clone(),
                role: Role::Employee,
                company_id: Some(Uuid::new_v4()),
                profile_id: Uuid::new_v4(),
            },
            user,
        }
    }

    #[tokio::test]
    async fn test_file_store_creates_parent_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested/session.json"));

        let session = sample();
        assert!(store.load().await.unwrap().is_none());
        store.save(&session).await.unwrap();
        assert!(store.path().exists());

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.token, session.token);
        assert_eq!(loaded.user.id, session.user.id);
        assert_eq!(loaded.user.full_name.as_deref(), Some("Ola Nordmann"));
        assert_eq!(loaded.principal, session.principal);

        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_password_hash_never_reaches_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.save(&sample()).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("password_hash"));
        assert!(raw.contains("ola@firma.no"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = FileSessionStore::new(&path);
        assert!(store.load().await.is_err());
    }
}
