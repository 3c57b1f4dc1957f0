//! In-memory stores for tests and local tooling.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use hrdesk_core::error::AppError;
use hrdesk_core::result::AppResult;
use hrdesk_entity::Role;
use hrdesk_entity::company::{Company, CreateCompany};
use hrdesk_entity::role::role::ADMIN_TABLE_ROLE;
use hrdesk_entity::role::{AdminProfile, CompanyUser};
use hrdesk_entity::user::{CreateUser, User, UserStatus};

use super::{AccountStore, RoleStore};

/// [`AccountStore`] backed by a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccountStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl MemoryAccountStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the status of a user.
    pub async fn set_status(&self, id: Uuid, status: UserStatus) -> AppResult<()> {
        self.modify(id, |u| u.status = status).await
    }

    /// Overwrite the reset token expiry of a user.
    pub async fn set_reset_expiry(&self, id: Uuid, expires_at: DateTime<Utc>) -> AppResult<()> {
        self.modify(id, |u| u.reset_token_expires_at = Some(expires_at))
            .await
    }

    async fn modify(&self, id: Uuid, f: impl FnOnce(&mut User)) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        f(user);
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.trim();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_reset_token(&self, digest: &str) -> AppResult<Option<User>> {
        let now = Utc::now();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| {
                u.reset_token.as_deref() == Some(digest)
                    && u.reset_token_expires_at.is_some_and(|exp| exp > now)
            })
            .cloned())
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let mut users = self.users.write().await;
        let email = data.email.trim();
        if users.values().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(AppError::conflict("Email already in use"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: data.password_hash.clone(),
            full_name: data.full_name.clone(),
            status: UserStatus::Active,
            failed_login_attempts: 0,
            locked_until: None,
            reset_token: None,
            reset_token_expires_at: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        self.modify(id, |u| {
            u.password_hash = password_hash.to_string();
            u.reset_token = None;
            u.reset_token_expires_at = None;
        })
        .await
    }

    async fn record_failed_attempt(&self, id: Uuid) -> AppResult<i32> {
        let mut attempts = 0;
        self.modify(id, |u| {
            u.failed_login_attempts += 1;
            attempts = u.failed_login_attempts;
        })
        .await?;
        Ok(attempts)
    }

    async fn lock_until(&self, id: Uuid, until: DateTime<Utc>) -> AppResult<()> {
        self.modify(id, |u| {
            u.locked_until = Some(until);
            u.failed_login_attempts = 0;
        })
        .await
    }

    async fn record_login(&self, id: Uuid) -> AppResult<()> {
        self.modify(id, |u| {
            u.last_login_at = Some(Utc::now());
            u.failed_login_attempts = 0;
            u.locked_until = None;
        })
        .await
    }

    async fn store_reset_token(
        &self,
        id: Uuid,
        digest: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.modify(id, |u| {
            u.reset_token = Some(digest.to_string());
            u.reset_token_expires_at = Some(expires_at);
        })
        .await
    }

    async fn consume_reset_token(
        &self,
        digest: &str,
        password_hash: &str,
    ) -> AppResult<Option<Uuid>> {
        let now = Utc::now();
        let mut users = self.users.write().await;
        let Some(user) = users.values_mut().find(|u| {
            u.reset_token.as_deref() == Some(digest)
                && u.reset_token_expires_at.is_some_and(|exp| exp > now)
        }) else {
            return Ok(None);
        };

        user.password_hash = password_hash.to_string();
        user.reset_token = None;
        user.reset_token_expires_at = None;
        user.failed_login_attempts = 0;
        user.locked_until = None;
        user.updated_at = now;
        Ok(Some(user.id))
    }
}

#[derive(Debug, Default)]
struct RoleTables {
    admins: HashMap<Uuid, AdminProfile>,
    members: HashMap<Uuid, CompanyUser>,
    companies: HashMap<Uuid, Company>,
}

/// [`RoleStore`] backed by `HashMap`s.
#[derive(Debug, Clone, Default)]
pub struct MemoryRoleStore {
    tables: Arc<RwLock<RoleTables>>,
}

impl MemoryRoleStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an `admin` row with a raw role string.
    pub async fn insert_admin(&self, user_id: Uuid, role: &str) -> AdminProfile {
        let profile = AdminProfile {
            id: Uuid::new_v4(),
            user_id,
            full_name: None,
            role: role.to_string(),
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .admins
            .insert(user_id, profile.clone());
        profile
    }

    /// Insert a `company_user` row with a raw role string.
    pub async fn insert_member(&self, user_id: Uuid, company_id: Uuid, role: &str) -> CompanyUser {
        let now = Utc::now();
        let member = CompanyUser {
            id: Uuid::new_v4(),
            user_id,
            company_id,
            full_name: String::new(),
            job_title: None,
            phone: None,
            role: role.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .await
            .members
            .insert(user_id, member.clone());
        member
    }

    /// Grant super-admin rights.
    pub async fn make_super_admin(&self, user_id: Uuid) -> AdminProfile {
        self.insert_admin(user_id, ADMIN_TABLE_ROLE).await
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn find_admin(&self, user_id: Uuid) -> AppResult<Option<AdminProfile>> {
        Ok(self.tables.read().await.admins.get(&user_id).cloned())
    }

    async fn find_company_user(&self, user_id: Uuid) -> AppResult<Option<CompanyUser>> {
        Ok(self.tables.read().await.members.get(&user_id).cloned())
    }

    async fn register_company(
        &self,
        user_id: Uuid,
        full_name: &str,
        company: &CreateCompany,
    ) -> AppResult<(Company, CompanyUser)> {
        let mut tables = self.tables.write().await;
        if tables.members.contains_key(&user_id) {
            return Err(AppError::conflict("User already belongs to a company"));
        }

        let now = Utc::now();
        let created = Company {
            id: Uuid::new_v4(),
            name: company.name.trim().to_string(),
            org_number: company.org_number.clone(),
            address: company.address.clone(),
            contact_email: company.contact_email.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let member = CompanyUser {
            id: Uuid::new_v4(),
            user_id,
            company_id: created.id,
            full_name: full_name.to_string(),
            job_title: None,
            phone: None,
            role: Role::CompanyAdmin
                .company_row_value()
                .unwrap_or("admin")
                .to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.companies.insert(created.id, created.clone());
        tables.members.insert(user_id, member.clone());
        Ok((created, member))
    }
}
