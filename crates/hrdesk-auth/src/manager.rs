//! Server-side authentication flows: sign-in, token verification, sign-up,
//! password change and password reset.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use hrdesk_core::config::AuthConfig;
use hrdesk_core::error::AppError;
use hrdesk_core::result::AppResult;
use hrdesk_core::traits::Mailer;
use hrdesk_entity::Principal;
use hrdesk_entity::company::CreateCompany;
use hrdesk_entity::user::{CreateUser, User, UserStatus};

use crate::jwt::{Claims, JwtDecoder, JwtEncoder, TokenBlocklist};
use crate::password::{PasswordHasher, PasswordValidator};
use crate::reset::{ResetToken, email, token};
use crate::role::RoleResolver;
use crate::store::{AccountStore, RoleStore};

/// Returned for unknown e-mails and wrong passwords alike.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
/// Returned for unknown, expired and already used reset tokens.
pub const INVALID_RESET_LINK: &str = "Reset link is invalid or has expired";

/// Result of a successful sign-in or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedIn {
    /// Signed session token.
    pub token: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
    /// The authenticated user.
    pub user: User,
    /// The resolved role.
    pub principal: Principal,
}

/// A verified token together with the current user and role.
#[derive(Debug, Clone)]
pub struct VerifiedSession {
    /// Decoded claims.
    pub claims: Claims,
    /// Current user row.
    pub user: User,
    /// Role resolved from the database at verification time.
    pub principal: Principal,
}

/// Self-registration input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUp {
    /// Sign-in e-mail.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Display name.
    pub full_name: Option<String>,
    /// Name of the company created with the account as its admin.
    pub company_name: String,
}

/// Orchestrates every authentication flow.
#[derive(Clone)]
pub struct AuthManager {
    accounts: Arc<dyn AccountStore>,
    roles: Arc<dyn RoleStore>,
    resolver: RoleResolver,
    hasher: PasswordHasher,
    validator: PasswordValidator,
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    blocklist: TokenBlocklist,
    mailer: Arc<dyn Mailer>,
    config: AuthConfig,
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("encoder", &self.encoder)
            .field("blocklist", &self.blocklist)
            .finish_non_exhaustive()
    }
}

impl AuthManager {
    /// Creates a manager over the given stores and mailer.
    pub fn new(
        config: &AuthConfig,
        accounts: Arc<dyn AccountStore>,
        roles: Arc<dyn RoleStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            resolver: RoleResolver::new(roles.clone()),
            accounts,
            roles,
            hasher: PasswordHasher::new(config.pbkdf2_iterations),
            validator: PasswordValidator::new(config),
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
            blocklist: TokenBlocklist::new(StdDuration::from_secs(config.jwt_ttl_minutes * 60)),
            mailer,
            config: config.clone(),
        }
    }

    /// Performs the sign-in flow:
    ///
    /// 1. Find the user by e-mail
    /// 2. Verify the password (counting failures)
    /// 3. Refuse locked and inactive accounts
    /// 4. Resolve the role (admin, then company_user)
    /// 5. Mint a token carrying `{sub, email, role}`
    /// 6. Record the login and upgrade outdated hashes
    ///
    /// A wrong password yields [`INVALID_CREDENTIALS`] whatever state the
    /// account is in, so callers cannot tell locked accounts from unknown
    /// addresses.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<SignedIn> {
        // Step 1: Find user
        let user = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::authentication(INVALID_CREDENTIALS))?;

        // Step 2: Verify password
        let now = Utc::now();
        if !self.hasher.verify(password, &user.password_hash)? {
            if !user.is_locked_at(now) {
                self.handle_failed_sign_in(&user).await?;
            }
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }

        // Step 3: Account state
        if user.status == UserStatus::Locked {
            return Err(AppError::authentication("This account has been locked"));
        }
        if user.is_locked_at(now) {
            warn!(user_id = %user.id, "Sign-in refused while locked out");
            return Err(AppError::authentication(
                "Too many failed attempts. Try again later.",
            ));
        }
        if !user.status.can_sign_in() {
            return Err(AppError::authentication("This account is not active"));
        }

        // Step 4: Role
        let principal = self.resolver.resolve(&user).await?;

        // Step 5: Token
        let issued = self.encoder.issue(&principal)?;

        // Step 6: Bookkeeping
        self.accounts.record_login(user.id).await?;
        if self.hasher.needs_rehash(&user.password_hash) {
            self.upgrade_hash(user.id, password).await;
        }

        info!(
            user_id = %user.id,
            role = %principal.role,
            company_id = ?principal.company_id,
            "Sign-in successful"
        );

        Ok(SignedIn {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
            principal,
        })
    }

    /// Verifies a token and reloads the caller.
    ///
    /// The role is always re-resolved from the role tables; the claim is
    /// only compared for logging.
    pub async fn verify(&self, token: &str) -> AppResult<VerifiedSession> {
        let claims = self.decoder.decode(token)?;

        if self.blocklist.is_revoked(claims.jti).await {
            return Err(AppError::authentication("Token has been revoked"));
        }

        let user = self
            .accounts
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::authentication("Account no longer exists"))?;

        if !user.status.can_sign_in() {
            return Err(AppError::authentication("This account is not active"));
        }

        let principal = self.resolver.resolve(&user).await?;
        if principal.role != claims.role {
            info!(
                user_id = %user.id,
                token_role = %claims.role,
                current_role = %principal.role,
                "Role changed since token was issued"
            );
        }

        Ok(VerifiedSession {
            claims,
            user,
            principal,
        })
    }

    /// Exchanges a valid token for a new one and revokes the old one.
    pub async fn refresh(&self, token: &str) -> AppResult<SignedIn> {
        let session = self.verify(token).await?;
        let issued = self.encoder.issue(&session.principal)?;
        self.blocklist.revoke(session.claims.jti).await;

        info!(user_id = %session.user.id, "Token refreshed");
        Ok(SignedIn {
            token: issued.token,
            expires_at: issued.expires_at,
            user: session.user,
            principal: session.principal,
        })
    }

    /// Revokes a token.
    pub async fn sign_out(&self, token: &str) -> AppResult<()> {
        let claims = self.decoder.decode(token)?;
        self.blocklist.revoke(claims.jti).await;
        info!(user_id = %claims.sub, "Signed out");
        Ok(())
    }

    /// Creates an active account with no role. Operators use this for
    /// accounts that are attached to a company or made super admin
    /// afterwards; self-registration goes through [`Self::sign_up`].
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> AppResult<User> {
        let email = normalize_email(email)?;
        self.validator.validate(password, &[email.as_str()])?;

        let password_hash = self.hasher.hash(password)?;
        let user = self
            .accounts
            .create(&CreateUser {
                email,
                password_hash,
                full_name: full_name.map(str::to_string),
            })
            .await?;

        info!(user_id = %user.id, "Account created");
        Ok(user)
    }

    /// Self-registration: creates the account together with a new company
    /// it administers. If the company cannot be created the user is removed
    /// again, so a successful sign-up can always sign in.
    pub async fn sign_up(&self, data: &SignUp) -> AppResult<User> {
        let name = data.company_name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Company name is required to sign up"));
        }

        let user = self
            .create_account(&data.email, &data.password, data.full_name.as_deref())
            .await?;

        let display_name = user.full_name.clone().unwrap_or_else(|| user.email.clone());
        let company = CreateCompany {
            name: name.to_string(),
            org_number: None,
            address: None,
            contact_email: Some(user.email.clone()),
        };

        match self
            .roles
            .register_company(user.id, &display_name, &company)
            .await
        {
            Ok((company, _)) => {
                info!(user_id = %user.id, company_id = %company.id, "Company self-registered");
            }
            Err(e) => {
                error!(
                    user_id = %user.id,
                    error = %e,
                    "Company registration failed, removing user"
                );
                if let Err(cleanup) = self.accounts.delete(user.id).await {
                    error!(user_id = %user.id, error = %cleanup, "Failed to remove user");
                }
                return Err(e);
            }
        }

        info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    /// Changes the password of a signed-in user.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self
            .accounts
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

        if !self.hasher.verify(current_password, &user.password_hash)? {
            return Err(AppError::authentication("Current password is incorrect"));
        }

        self.validator
            .validate_not_same(current_password, new_password)?;
        self.validator
            .validate(new_password, &[user.email.as_str()])?;

        let hash = self.hasher.hash(new_password)?;
        self.accounts.update_password(user.id, &hash).await?;

        info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    /// Starts a password reset: stores the digest of a fresh token and
    /// e-mails the link. Unknown and inactive addresses are accepted
    /// silently.
    pub async fn request_password_reset(&self, email_address: &str) -> AppResult<()> {
        let Some(user) = self.accounts.find_by_email(email_address).await? else {
            info!("Password reset requested for unknown e-mail");
            return Ok(());
        };

        if !user.status.can_sign_in() {
            info!(user_id = %user.id, status = %user.status, "Password reset requested for inactive user");
            return Ok(());
        }

        let ttl = self.config.reset_token_ttl_minutes;
        let reset = ResetToken::generate(Duration::minutes(ttl as i64))?;
        self.accounts
            .store_reset_token(user.id, &reset.digest, reset.expires_at)
            .await?;

        let message = email::reset_email(&user.email, &reset.raw, &self.config.deep_link_base, ttl)?;
        self.mailer.send(&message).await?;

        info!(user_id = %user.id, expires_at = %reset.expires_at, "Password reset e-mail sent");
        Ok(())
    }

    /// Completes a password reset. The token is consumed exactly once.
    pub async fn confirm_password_reset(&self, raw_token: &str, new_password: &str) -> AppResult<()> {
        let raw_token = raw_token.trim();
        if !token::is_well_formed(raw_token) {
            return Err(AppError::validation(INVALID_RESET_LINK));
        }
        let digest = token::digest(raw_token);

        let user = self
            .accounts
            .find_by_reset_token(&digest)
            .await?
            .ok_or_else(|| AppError::validation(INVALID_RESET_LINK))?;

        self.validator
            .validate(new_password, &[user.email.as_str()])?;
        let hash = self.hasher.hash(new_password)?;

        match self.accounts.consume_reset_token(&digest, &hash).await? {
            Some(user_id) => {
                info!(user_id = %user_id, "Password reset completed");
                Ok(())
            }
            None => Err(AppError::validation(INVALID_RESET_LINK)),
        }
    }

    /// Creates an account whose password nobody knows. The owner sets one
    /// through the link sent by [`Self::send_invitation`].
    pub async fn create_invited_account(&self, email: &str, full_name: &str) -> AppResult<User> {
        let email = normalize_email(email)?;
        let mut secret = [0u8; 32];
        rand::thread_rng()
            .try_fill_bytes(&mut secret)
            .map_err(|e| AppError::internal(format!("RNG failure: {e}")))?;
        let password_hash = self.hasher.hash(&hex::encode(secret))?;

        let user = self
            .accounts
            .create(&CreateUser {
                email,
                password_hash,
                full_name: Some(full_name.to_string()),
            })
            .await?;
        info!(user_id = %user.id, "Invited account created");
        Ok(user)
    }

    /// E-mails a set-password link to an invited user.
    pub async fn send_invitation(&self, user: &User, company_name: &str) -> AppResult<()> {
        let reset = ResetToken::generate(Duration::hours(self.config.invitation_ttl_hours as i64))?;
        self.accounts
            .store_reset_token(user.id, &reset.digest, reset.expires_at)
            .await?;

        let message = email::invitation_email(
            &user.email,
            company_name,
            &reset.raw,
            &self.config.deep_link_base,
        )?;
        self.mailer.send(&message).await?;

        info!(user_id = %user.id, "Invitation e-mail sent");
        Ok(())
    }

    /// Deletes an account.
    pub async fn remove_account(&self, user_id: Uuid) -> AppResult<bool> {
        self.accounts.delete(user_id).await
    }

    /// Counts a failed sign-in and locks the account once the configured
    /// threshold is reached.
    async fn handle_failed_sign_in(&self, user: &User) -> AppResult<()> {
        let attempts = self.accounts.record_failed_attempt(user.id).await?;
        warn!(user_id = %user.id, attempts, "Failed sign-in attempt");

        if attempts >= self.config.max_failed_attempts {
            let until = Utc::now() + Duration::minutes(self.config.lockout_duration_minutes as i64);
            self.accounts.lock_until(user.id, until).await?;
            warn!(user_id = %user.id, until = %until, "Account temporarily locked");
        }
        Ok(())
    }

    async fn upgrade_hash(&self, user_id: Uuid, password: &str) {
        let result = match self.hasher.hash(password) {
            Ok(hash) => self.accounts.update_password(user_id, &hash).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => info!(user_id = %user_id, "Password hash upgraded"),
            Err(e) => warn!(user_id = %user_id, error = %e, "Failed to upgrade password hash"),
        }
    }
}

fn normalize_email(raw: &str) -> AppResult<String> {
    let email = raw.trim();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::validation(format!("'{email}' is not a valid e-mail address")));
    }
    Ok(email.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hrdesk_core::error::ErrorKind;
    use hrdesk_core::traits::OutboundEmail;
    use hrdesk_core::types::DeepLink;
    use hrdesk_entity::Role;
    use hrdesk_entity::company::Company;
    use hrdesk_entity::role::{AdminProfile, CompanyUser};
    use tokio::sync::Mutex;

    use crate::store::{MemoryAccountStore, MemoryRoleStore};

    const PASSWORD: &str = "violet-Harbor-93-lantern";
    const NEW_PASSWORD: &str = "copper-Meadow-41-thistle";

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutboundEmail>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &OutboundEmail) -> AppResult<()> {
            self.sent.lock().await.push(message.clone());
            Ok(())
        }
    }

    struct FailingRoleStore;

    #[async_trait]
    impl RoleStore for FailingRoleStore {
        async fn find_admin(&self, _user_id: Uuid) -> AppResult<Option<AdminProfile>> {
            Ok(None)
        }

        async fn find_company_user(&self, _user_id: Uuid) -> AppResult<Option<CompanyUser>> {
            Ok(None)
        }

        async fn register_company(
            &self,
            _user_id: Uuid,
            _full_name: &str,
            _company: &CreateCompany,
        ) -> AppResult<(Company, CompanyUser)> {
            Err(AppError::database("insert into company failed"))
        }
    }

    struct Harness {
        manager: AuthManager,
        accounts: MemoryAccountStore,
        roles: MemoryRoleStore,
        mailer: Arc<RecordingMailer>,
    }

    fn config() -> AuthConfig {
        AuthConfig {
            pbkdf2_iterations: 10_000,
            ..AuthConfig::default()
        }
    }

    fn harness() -> Harness {
        let accounts = MemoryAccountStore::new();
        let roles = MemoryRoleStore::new();
        let mailer = Arc::new(RecordingMailer::default());
        let manager = AuthManager::new(
            &config(),
            Arc::new(accounts.clone()),
            Arc::new(roles.clone()),
            mailer.clone(),
        );
        Harness {
            manager,
            accounts,
            roles,
            mailer,
        }
    }

    async fn employee(h: &Harness, email: &str) -> (User, Uuid) {
        let user = h
            .manager
            .create_account(email, PASSWORD, Some("Ola Nordmann"))
            .await
            .unwrap();
        let company_id = Uuid::new_v4();
        h.roles.insert_member(user.id, company_id, "employee").await;
        (user, company_id)
    }

    async fn last_reset_token(h: &Harness) -> String {
        let sent = h.mailer.sent.lock().await;
        let text = &sent.last().expect("no e-mail sent").text;
        let start = text.find("hrdesk://").unwrap();
        let url = text[start..].split_whitespace().next().unwrap();
        match DeepLink::parse(url, "hrdesk://app/").unwrap() {
            DeepLink::ResetPassword { token } => token,
            other => panic!("unexpected link {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sign_in_resolves_company_role() {
        let h = harness();
        let (user, company_id) = employee(&h, "ola@firma.no").await;

        let signed_in = h.manager.sign_in("OLA@firma.no", PASSWORD).await.unwrap();
        assert_eq!(signed_in.user.id, user.id);
        assert_eq!(signed_in.principal.role, Role::Employee);
        assert_eq!(signed_in.principal.company_id, Some(company_id));

        let session = h.manager.verify(&signed_in.token).await.unwrap();
        assert_eq!(session.claims.sub, user.id);
        assert_eq!(session.principal.role, Role::Employee);
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_look_the_same() {
        let h = harness();
        employee(&h, "kari@firma.no").await;

        let unknown = h.manager.sign_in("nobody@firma.no", PASSWORD).await.unwrap_err();
        let wrong = h.manager.sign_in("kari@firma.no", "wrong-password-1").await.unwrap_err();
        assert_eq!(unknown.kind, ErrorKind::Authentication);
        assert_eq!(wrong.kind, ErrorKind::Authentication);
        assert_eq!(unknown.message, wrong.message);
    }

    #[tokio::test]
    async fn test_inactive_account_cannot_sign_in() {
        let h = harness();
        let (user, _) = employee(&h, "per@firma.no").await;
        h.accounts.set_status(user.id, UserStatus::Inactive).await.unwrap();

        let err = h.manager.sign_in("per@firma.no", PASSWORD).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert!(err.message.contains("not active"));
    }

    #[tokio::test]
    async fn test_account_without_role_is_refused() {
        let h = harness();
        h.manager
            .create_account("loner@firma.no", PASSWORD, None)
            .await
            .unwrap();

        let err = h.manager.sign_in("loner@firma.no", PASSWORD).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_lockout_after_repeated_failures() {
        let h = harness();
        employee(&h, "lise@firma.no").await;

        for _ in 0..config().max_failed_attempts {
            let _ = h.manager.sign_in("lise@firma.no", "wrong-password-1").await;
        }

        let err = h.manager.sign_in("lise@firma.no", PASSWORD).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert!(err.message.contains("Too many failed attempts"));
    }

    #[tokio::test]
    async fn test_locked_account_with_wrong_password_looks_unknown() {
        let h = harness();
        let (user, _) = employee(&h, "lars@firma.no").await;

        for _ in 0..config().max_failed_attempts {
            let _ = h.manager.sign_in("lars@firma.no", "wrong-password-1").await;
        }
        let locked = h.manager.sign_in("lars@firma.no", "wrong-password-1").await.unwrap_err();
        let unknown = h.manager.sign_in("nobody@firma.no", "wrong-password-1").await.unwrap_err();
        assert_eq!(locked.kind, unknown.kind);
        assert_eq!(locked.message, INVALID_CREDENTIALS);
        assert_eq!(locked.message, unknown.message);

        h.accounts.set_status(user.id, UserStatus::Locked).await.unwrap();
        let disabled = h.manager.sign_in("lars@firma.no", "wrong-password-1").await.unwrap_err();
        assert_eq!(disabled.message, INVALID_CREDENTIALS);

        let err = h.manager.sign_in("lars@firma.no", PASSWORD).await.unwrap_err();
        assert!(err.message.contains("locked"));
    }

    #[tokio::test]
    async fn test_expired_lockout_starts_a_fresh_count() {
        let h = harness();
        let (user, _) = employee(&h, "mia@firma.no").await;

        for _ in 0..config().max_failed_attempts {
            let _ = h.manager.sign_in("mia@firma.no", "wrong-password-1").await;
        }
        let stored = h.accounts.find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.locked_until.is_some());
        assert_eq!(stored.failed_login_attempts, 0);

        h.accounts
            .lock_until(user.id, Utc::now() - Duration::minutes(1))
            .await
            .unwrap();
        let err = h.manager.sign_in("mia@firma.no", "wrong-password-1").await.unwrap_err();
        assert_eq!(err.message, INVALID_CREDENTIALS);

        assert!(h.manager.sign_in("mia@firma.no", PASSWORD).await.is_ok());
    }

    #[tokio::test]
    async fn test_verify_picks_up_role_changes() {
        let h = harness();
        let (user, company_id) = employee(&h, "nils@firma.no").await;
        let signed_in = h.manager.sign_in("nils@firma.no", PASSWORD).await.unwrap();

        h.roles.insert_member(user.id, company_id, "admin").await;

        let session = h.manager.verify(&signed_in.token).await.unwrap();
        assert_eq!(session.claims.role, Role::Employee);
        assert_eq!(session.principal.role, Role::CompanyAdmin);
    }

    #[tokio::test]
    async fn test_sign_out_and_refresh_revoke_tokens() {
        let h = harness();
        employee(&h, "eva@firma.no").await;
        let first = h.manager.sign_in("eva@firma.no", PASSWORD).await.unwrap();

        let second = h.manager.refresh(&first.token).await.unwrap();
        let err = h.manager.verify(&first.token).await.unwrap_err();
        assert_eq!(err.message, "Token has been revoked");

        h.manager.sign_out(&second.token).await.unwrap();
        assert!(h.manager.verify(&second.token).await.is_err());
    }

    #[tokio::test]
    async fn test_password_reset_flow_is_single_use() {
        let h = harness();
        employee(&h, "siri@firma.no").await;

        h.manager.request_password_reset("siri@firma.no").await.unwrap();
        let token = last_reset_token(&h).await;

        h.manager
            .confirm_password_reset(&token, NEW_PASSWORD)
            .await
            .unwrap();
        assert!(h.manager.sign_in("siri@firma.no", NEW_PASSWORD).await.is_ok());
        assert!(h.manager.sign_in("siri@firma.no", PASSWORD).await.is_err());

        let err = h
            .manager
            .confirm_password_reset(&token, "another-Strong-77-pass")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, INVALID_RESET_LINK);
    }

    #[tokio::test]
    async fn test_expired_reset_token_is_rejected() {
        let h = harness();
        let (user, _) = employee(&h, "tor@firma.no").await;

        h.manager.request_password_reset("tor@firma.no").await.unwrap();
        let token = last_reset_token(&h).await;
        h.accounts
            .set_reset_expiry(user.id, Utc::now() - Duration::minutes(1))
            .await
            .unwrap();

        let err = h
            .manager
            .confirm_password_reset(&token, NEW_PASSWORD)
            .await
            .unwrap_err();
        assert_eq!(err.message, INVALID_RESET_LINK);
    }

    #[tokio::test]
    async fn test_reset_for_unknown_email_is_silent() {
        let h = harness();
        h.manager
            .request_password_reset("ghost@firma.no")
            .await
            .unwrap();
        assert!(h.mailer.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_sign_up_with_company_makes_company_admin() {
        let h = harness();
        h.manager
            .sign_up(&SignUp {
                email: "founder@startup.no".to_string(),
                password: PASSWORD.to_string(),
                full_name: Some("Founder".to_string()),
                company_name: "Startup AS".to_string(),
            })
            .await
            .unwrap();

        let signed_in = h.manager.sign_in("founder@startup.no", PASSWORD).await.unwrap();
        assert_eq!(signed_in.principal.role, Role::CompanyAdmin);
        assert!(signed_in.principal.company_id.is_some());
    }

    #[tokio::test]
    async fn test_sign_up_requires_company_and_creates_nothing_without_one() {
        let h = harness();
        let err = h
            .manager
            .sign_up(&SignUp {
                email: "solo@firma.no".to_string(),
                password: PASSWORD.to_string(),
                full_name: None,
                company_name: "   ".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(h.accounts.find_by_email("solo@firma.no").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_up_removes_user_when_company_fails() {
        let accounts = MemoryAccountStore::new();
        let manager = AuthManager::new(
            &config(),
            Arc::new(accounts.clone()),
            Arc::new(FailingRoleStore),
            Arc::new(RecordingMailer::default()),
        );

        let err = manager
            .sign_up(&SignUp {
                email: "broken@startup.no".to_string(),
                password: PASSWORD.to_string(),
                full_name: None,
                company_name: "Broken AS".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);
        assert!(accounts.find_by_email("broken@startup.no").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_up_rejects_weak_password_and_bad_email() {
        let h = harness();
        let weak = h
            .manager
            .sign_up(&SignUp {
                email: "weak@firma.no".to_string(),
                password: "password1".to_string(),
                full_name: None,
                company_name: "Firma AS".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(weak.kind, ErrorKind::Validation);

        let bad = h
            .manager
            .sign_up(&SignUp {
                email: "not-an-email".to_string(),
                password: PASSWORD.to_string(),
                full_name: None,
                company_name: "Firma AS".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(bad.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_change_password_requires_current_password() {
        let h = harness();
        let (user, _) = employee(&h, "ali@firma.no").await;

        let err = h
            .manager
            .change_password(user.id, "wrong-password-1", NEW_PASSWORD)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);

        h.manager
            .change_password(user.id, PASSWORD, NEW_PASSWORD)
            .await
            .unwrap();
        assert!(h.manager.sign_in("ali@firma.no", NEW_PASSWORD).await.is_ok());
    }

    #[tokio::test]
    async fn test_invitation_link_sets_first_password() {
        let h = harness();
        let user = h
            .manager
            .create_invited_account("new@firma.no", "New Hire")
            .await
            .unwrap();
        h.roles.insert_member(user.id, Uuid::new_v4(), "employee").await;
        h.manager.send_invitation(&user, "Firma AS").await.unwrap();

        let subject = h.mailer.sent.lock().await[0].subject.clone();
        assert!(subject.contains("Firma AS"));

        let token = last_reset_token(&h).await;
        h.manager
            .confirm_password_reset(&token, NEW_PASSWORD)
            .await
            .unwrap();
        assert!(h.manager.sign_in("new@firma.no", NEW_PASSWORD).await.is_ok());
    }

    #[tokio::test]
    async fn test_legacy_hash_is_upgraded_on_sign_in() {
        use argon2::password_hash::{PasswordHasher as _, SaltString, rand_core::OsRng};

        let h = harness();
        let salt = SaltString::generate(&mut OsRng);
        let legacy = argon2::Argon2::default()
            .hash_password(PASSWORD.as_bytes(), &salt)
            .unwrap()
            .to_string();
        let user = h
            .accounts
            .create(&CreateUser {
                email: "old@firma.no".to_string(),
                password_hash: legacy,
                full_name: None,
            })
            .await
            .unwrap();
        h.roles.insert_member(user.id, Uuid::new_v4(), "employee").await;

        h.manager.sign_in("old@firma.no", PASSWORD).await.unwrap();

        let stored = h.accounts.find_by_id(user.id).await.unwrap().unwrap();
        assert!(!stored.password_hash.starts_with("$argon2"));
        assert!(h.manager.sign_in("old@firma.no", PASSWORD).await.is_ok());
    }
}
