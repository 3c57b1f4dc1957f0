//! The signed-in state of a client.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use hrdesk_core::result::AppResult;
use hrdesk_entity::Principal;
use hrdesk_entity::user::User;

use super::persistence::{PersistedSession, SessionPersistence};
use crate::manager::{AuthManager, SignUp};

/// Current auth state of a client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// No valid session.
    SignedOut,
    /// A verified session.
    SignedIn {
        /// Session token.
        token: String,
        /// When the token expires.
        expires_at: DateTime<Utc>,
        /// Signed-in user.
        user: User,
        /// Role resolved from the role tables.
        principal: Principal,
    },
}

impl SessionState {
    /// Whether a user is signed in.
    pub fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn { .. })
    }

    /// The resolved principal when signed in.
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::SignedIn { principal, .. } => Some(principal),
            Self::SignedOut => None,
        }
    }
}

impl From<PersistedSession> for SessionState {
    fn from(p: PersistedSession) -> Self {
        Self::SignedIn {
            token: p.token,
            expires_at: p.expires_at,
            user: p.user,
            principal: p.principal,
        }
    }
}

/// Client auth provider over an [`AuthManager`].
pub struct AuthSession {
    manager: Arc<AuthManager>,
    persistence: Arc<dyn SessionPersistence>,
    state: RwLock<SessionState>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession").finish_non_exhaustive()
    }
}

impl AuthSession {
    /// Creates a signed-out session.
    pub fn new(manager: Arc<AuthManager>, persistence: Arc<dyn SessionPersistence>) -> Self {
        Self {
            manager,
            persistence,
            state: RwLock::new(SessionState::SignedOut),
        }
    }

    /// Current state.
    pub async fn current(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// The user record saved at the last sign-in or restore, read without
    /// contacting the server. Lets a client greet the user while
    /// [`Self::restore`] is still verifying the token.
    pub async fn stored_user(&self) -> Option<User> {
        match self.persistence.load().await {
            Ok(persisted) => persisted.map(|p| p.user),
            Err(e) => {
                warn!(error = %e, "Stored session is unreadable");
                None
            }
        }
    }

    /// Restores the persisted session on start.
    ///
    /// The stored token is verified and the role re-resolved; the stored user
    /// record and role are then replaced with the fresh ones. Any failure
    /// (missing, unreadable, expired, revoked, deactivated, no role) clears
    /// the stored session and leaves the client signed out.
    pub async fn restore(&self) -> SessionState {
        let persisted = match self.persistence.load().await {
            Ok(Some(persisted)) => persisted,
            Ok(None) => return self.set(SessionState::SignedOut).await,
            Err(e) => {
                warn!(error = %e, "Stored session is unreadable");
                return self.sign_out_locally().await;
            }
        };

        match self.manager.verify(&persisted.token).await {
            Ok(verified) => {
                info!(
                    user_id = %verified.user.id,
                    role = %verified.principal.role,
                    "Session restored"
                );
                let refreshed = PersistedSession {
                    token: persisted.token,
                    expires_at: verified.claims.expires_at(),
                    user: verified.user,
                    principal: verified.principal,
                };
                if let Err(e) = self.persistence.save(&refreshed).await {
                    warn!(error = %e, "Failed to refresh stored session");
                }
                self.set(refreshed.into()).await
            }
            Err(e) => {
                info!(email = %persisted.user.email, error = %e, "Stored session rejected");
                self.sign_out_locally().await
            }
        }
    }

    /// Signs in and persists the token together with the user record.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<SessionState> {
        let signed_in = self.manager.sign_in(email, password).await?;

        let persisted = PersistedSession {
            token: signed_in.token,
            expires_at: signed_in.expires_at,
            user: signed_in.user,
            principal: signed_in.principal,
        };
        self.persistence.save(&persisted).await?;

        Ok(self.set(persisted.into()).await)
    }

    /// Revokes the token and clears local state. Revocation failures are
    /// logged; the client ends up signed out regardless.
    pub async fn sign_out(&self) -> SessionState {
        if let SessionState::SignedIn { token, .. } = self.current().await {
            if let Err(e) = self.manager.sign_out(&token).await {
                warn!(error = %e, "Token revocation failed");
            }
        }
        self.sign_out_locally().await
    }

    /// Asks for a reset link.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        self.manager.request_password_reset(email).await
    }

    /// Completes a reset with the token from the e-mailed link.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()> {
        self.manager.confirm_password_reset(token, new_password).await
    }

    /// Registers a company with the new user as its admin, then signs in.
    pub async fn sign_up(&self, data: &SignUp) -> AppResult<SessionState> {
        self.manager.sign_up(data).await?;
        self.sign_in(&data.email, &data.password).await
    }

    async fn sign_out_locally(&self) -> SessionState {
        if let Err(e) = self.persistence.clear().await {
            warn!(error = %e, "Failed to clear stored session");
        }
        self.set(SessionState::SignedOut).await
    }

    async fn set(&self, next: SessionState) -> SessionState {
        *self.state.write().await = next.clone();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hrdesk_core::config::AuthConfig;
    use hrdesk_core::traits::{Mailer, OutboundEmail};
    use hrdesk_entity::Role;
    use hrdesk_entity::user::UserStatus;
    use uuid::Uuid;

    use crate::client::persistence::{FileSessionStore, MemorySessionStore};
    use crate::store::{AccountStore, MemoryAccountStore, MemoryRoleStore};

    const PASSWORD: &str = "violet-Harbor-93-lantern";

    struct NullMailer;

    #[async_trait]
    impl Mailer for NullMailer {
        async fn send(&self, _message: &OutboundEmail) -> AppResult<()> {
            Ok(())
        }
    }

    struct Fixture {
        manager: Arc<AuthManager>,
        accounts: MemoryAccountStore,
        roles: MemoryRoleStore,
    }

    async fn fixture() -> (Fixture, User) {
        let accounts = MemoryAccountStore::new();
        let roles = MemoryRoleStore::new();
        let config = AuthConfig {
            pbkdf2_iterations: 10_000,
            ..AuthConfig::default()
        };
        let manager = Arc::new(AuthManager::new(
            &config,
            Arc::new(accounts.clone()),
            Arc::new(roles.clone()),
            Arc::new(NullMailer),
        ));
        let user = manager
            .create_account("kari@firma.no", PASSWORD, Some("Kari"))
            .await
            .unwrap();
        roles.insert_member(user.id, Uuid::new_v4(), "employee").await;
        (
            Fixture {
                manager,
                accounts,
                roles,
            },
            user,
        )
    }

    #[tokio::test]
    async fn test_restore_after_restart() {
        let (fx, _) = fixture().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let first = AuthSession::new(fx.manager.clone(), Arc::new(FileSessionStore::new(&path)));
        first.sign_in("kari@firma.no", PASSWORD).await.unwrap();

        let second = AuthSession::new(fx.manager.clone(), Arc::new(FileSessionStore::new(&path)));
        let stored = second.stored_user().await.unwrap();
        assert_eq!(stored.email, "kari@firma.no");
        assert_eq!(stored.full_name.as_deref(), Some("Kari"));
        assert!(!second.current().await.is_signed_in());

        let state = second.restore().await;
        assert!(state.is_signed_in());
        assert_eq!(state.principal().unwrap().role, Role::Employee);
    }

    #[tokio::test]
    async fn test_restore_re_resolves_role() {
        let (fx, user) = fixture().await;
        let store = Arc::new(MemorySessionStore::new());
        let session = AuthSession::new(fx.manager.clone(), store.clone());
        session.sign_in("kari@firma.no", PASSWORD).await.unwrap();

        fx.roles.make_super_admin(user.id).await;

        let restored = AuthSession::new(fx.manager.clone(), store.clone()).restore().await;
        assert_eq!(restored.principal().unwrap().role, Role::SuperAdmin);
        let persisted = store.load().await.unwrap().unwrap();
        assert_eq!(persisted.principal.role, Role::SuperAdmin);
    }

    #[tokio::test]
    async fn test_restore_clears_rejected_session() {
        let (fx, user) = fixture().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let session = AuthSession::new(fx.manager.clone(), Arc::new(FileSessionStore::new(&path)));
        session.sign_in("kari@firma.no", PASSWORD).await.unwrap();

        fx.accounts
            .set_status(user.id, UserStatus::Inactive)
            .await
            .unwrap();

        let state = session.restore().await;
        assert!(!state.is_signed_in());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_restore_clears_garbage_token() {
        let (fx, user) = fixture().await;
        let store = Arc::new(MemorySessionStore::new());
        let genuine = AuthSession::new(fx.manager.clone(), store.clone());
        genuine.sign_in("kari@firma.no", PASSWORD).await.unwrap();
        let mut persisted = store.load().await.unwrap().unwrap();
        persisted.token = "not-a-token".to_string();
        store.save(&persisted).await.unwrap();
        assert_eq!(persisted.user.id, user.id);

        let session = AuthSession::new(fx.manager.clone(), store.clone());
        assert!(!session.restore().await.is_signed_in());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_up_registers_company_admin() {
        let (fx, _) = fixture().await;
        let session = AuthSession::new(fx.manager.clone(), Arc::new(MemorySessionStore::new()));

        let state = session
            .sign_up(&SignUp {
                email: "founder@bakeri.no".to_string(),
                password: PASSWORD.to_string(),
                full_name: None,
                company_name: "Bakeri AS".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(state.principal().unwrap().role, Role::CompanyAdmin);

        let err = session
            .sign_up(&SignUp {
                email: "solo@bakeri.no".to_string(),
                password: PASSWORD.to_string(),
                full_name: None,
                company_name: String::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, hrdesk_core::error::ErrorKind::Validation);
        assert!(fx.accounts.find_by_email("solo@bakeri.no").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_revokes_and_clears() {
        let (fx, _) = fixture().await;
        let store = Arc::new(MemorySessionStore::new());
        let session = AuthSession::new(fx.manager.clone(), store.clone());
        let state = session.sign_in("kari@firma.no", PASSWORD).await.unwrap();
        let SessionState::SignedIn { token, .. } = state else {
            panic!("expected signed in");
        };

        assert!(!session.sign_out().await.is_signed_in());
        assert!(store.load().await.unwrap().is_none());
        assert!(fx.manager.verify(&token).await.is_err());
    }
}
