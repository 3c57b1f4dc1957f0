//! Storage seams used by the auth layer.
//!
//! The [`crate::AuthManager`] talks to accounts and role tables through
//! these traits. Production uses the Postgres adapters; tests and local
//! tooling use the in-memory ones.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use hrdesk_core::result::AppResult;
use hrdesk_entity::company::{Company, CreateCompany};
use hrdesk_entity::role::{AdminProfile, CompanyUser};
use hrdesk_entity::user::{CreateUser, User};

pub use memory::{MemoryAccountStore, MemoryRoleStore};
pub use postgres::{PgAccountStore, PgRoleStore};

/// Credential table operations.
#[async_trait]
pub trait AccountStore: Send + Sync + 'static {
    /// Find a user by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by e-mail, ignoring case.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find the user holding an unexpired reset token digest.
    async fn find_by_reset_token(&self, digest: &str) -> AppResult<Option<User>>;

    /// Create an active user. Duplicate e-mails are a conflict.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    /// Delete a user.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Replace the password hash and drop any outstanding reset token.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()>;

    /// Count a failed sign-in and return the new total.
    async fn record_failed_attempt(&self, id: Uuid) -> AppResult<i32>;

    /// Refuse sign-in until `until` and restart the failure count, so the
    /// next lock needs a full run of failures after this one expires.
    async fn lock_until(&self, id: Uuid, until: DateTime<Utc>) -> AppResult<()>;

    /// Record a successful sign-in and clear failure counters.
    async fn record_login(&self, id: Uuid) -> AppResult<()>;

    /// Store a reset token digest and its expiry.
    async fn store_reset_token(
        &self,
        id: Uuid,
        digest: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Atomically consume an unexpired reset token and set a new password.
    /// Returns `None` when the token is unknown, expired or already used.
    async fn consume_reset_token(&self, digest: &str, password_hash: &str)
    -> AppResult<Option<Uuid>>;
}

/// Role table operations.
#[async_trait]
pub trait RoleStore: Send + Sync + 'static {
    /// The `admin` row of a user.
    async fn find_admin(&self, user_id: Uuid) -> AppResult<Option<AdminProfile>>;

    /// The `company_user` row of a user.
    async fn find_company_user(&self, user_id: Uuid) -> AppResult<Option<CompanyUser>>;

    /// Create a company with `user_id` as its first company admin.
    async fn register_company(
        &self,
        user_id: Uuid,
        full_name: &str,
        company: &CreateCompany,
    ) -> AppResult<(Company, CompanyUser)>;
}
