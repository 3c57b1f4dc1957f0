//! Postgres-backed stores.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use hrdesk_core::error::{AppError, ErrorKind};
use hrdesk_core::result::AppResult;
use hrdesk_database::repositories::{
    AdminRepository, CompanyRepository, CompanyUserRepository, UserRepository,
};
use hrdesk_entity::Role;
use hrdesk_entity::company::{Company, CreateCompany};
use hrdesk_entity::role::{AdminProfile, CompanyUser, CreateCompanyUser};
use hrdesk_entity::user::{CreateUser, User};

use super::{AccountStore, RoleStore};

/// [`AccountStore`] over the `users` table.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    users: UserRepository,
}

impl PgAccountStore {
    /// Creates a store on `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.users.find_by_email(email).await
    }

    async fn find_by_reset_token(&self, digest: &str) -> AppResult<Option<User>> {
        self.users.find_by_reset_token(digest).await
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        self.users.create(data).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        self.users.delete(id).await
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        self.users.update_password(id, password_hash).await
    }

    async fn record_failed_attempt(&self, id: Uuid) -> AppResult<i32> {
        self.users.increment_failed_attempts(id).await
    }

    async fn lock_until(&self, id: Uuid, until: DateTime<Utc>) -> AppResult<()> {
        self.users.lock_until(id, until).await
    }

    async fn record_login(&self, id: Uuid) -> AppResult<()> {
        self.users.record_login(id).await
    }

    async fn store_reset_token(
        &self,
        id: Uuid,
        digest: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.users.store_reset_token(id, digest, expires_at).await
    }

    async fn consume_reset_token(
        &self,
        digest: &str,
        password_hash: &str,
    ) -> AppResult<Option<Uuid>> {
        self.users.consume_reset_token(digest, password_hash).await
    }
}

/// [`RoleStore`] over the `admin`, `company` and `company_user` tables.
///
/// Role lookups run as the table owner; they happen before a caller scope
/// exists.
#[derive(Debug, Clone)]
pub struct PgRoleStore {
    pool: PgPool,
    admins: AdminRepository,
}

impl PgRoleStore {
    /// Creates a store on `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self {
            admins: AdminRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl RoleStore for PgRoleStore {
    async fn find_admin(&self, user_id: Uuid) -> AppResult<Option<AdminProfile>> {
        self.admins.find_by_user_id(user_id).await
    }

    async fn find_company_user(&self, user_id: Uuid) -> AppResult<Option<CompanyUser>> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
        })?;
        CompanyUserRepository::find_by_user_id(&mut conn, user_id).await
    }

    async fn register_company(
        &self,
        user_id: Uuid,
        full_name: &str,
        company: &CreateCompany,
    ) -> AppResult<(Company, CompanyUser)> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let created = CompanyRepository::create(&mut tx, company).await?;
        let membership = CompanyUserRepository::create(
            &mut tx,
            &CreateCompanyUser {
                user_id,
                company_id: created.id,
                full_name: full_name.to_string(),
                job_title: None,
                phone: None,
                role: Role::CompanyAdmin,
            },
        )
        .await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit registration", e)
        })?;

        info!(company_id = %created.id, user_id = %user_id, "Company registered");
        Ok((created, membership))
    }
}
