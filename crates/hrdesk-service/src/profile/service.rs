//! Profile reads and self-service updates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

use hrdesk_auth::policy::{Action, PolicyEnforcer, RowScope, Table};
use hrdesk_core::error::AppError;
use hrdesk_database::repositories::CompanyUserRepository;
use hrdesk_database::{AdminRepository, UserRepository, begin_scoped, commit};
use hrdesk_entity::Principal;
use hrdesk_entity::role::{AdminProfile, CompanyUser, UpdateCompanyUser};
use hrdesk_entity::user::User;

use crate::context::RequestContext;

/// Everything the profile screen shows.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    /// Account row.
    pub user: User,
    /// Resolved role.
    pub principal: Principal,
    /// Super-admin profile, if any.
    pub admin: Option<AdminProfile>,
    /// Company profile, if any.
    pub employee: Option<CompanyUser>,
}

/// Fields a user may change about themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    /// New full name.
    pub full_name: Option<String>,
    /// New phone number (company users only).
    pub phone: Option<String>,
}

/// Reads and updates the caller's own profile.
#[derive(Debug, Clone)]
pub struct ProfileService {
    pool: PgPool,
    policy: Arc<PolicyEnforcer>,
    users: UserRepository,
    admins: AdminRepository,
}

impl ProfileService {
    /// Creates a new profile service.
    pub fn new(pool: PgPool, policy: Arc<PolicyEnforcer>) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            admins: AdminRepository::new(pool.clone()),
            pool,
            policy,
        }
    }

    /// Loads the caller's profile.
    pub async fn get(&self, ctx: &RequestContext) -> Result<Profile, AppError> {
        let user = self
            .users
            .find_by_id(ctx.user_id())
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        let admin = self.admins.find_by_user_id(ctx.user_id()).await?;

        let employee = if ctx.principal.company_id.is_some() {
            let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
            let member = CompanyUserRepository::find_by_user_id(&mut tx, ctx.user_id()).await?;
            commit(tx).await?;
            member
        } else {
            None
        };

        Ok(Profile {
            user,
            principal: ctx.principal.clone(),
            admin,
            employee,
        })
    }

    /// Updates the caller's name and phone.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        req: UpdateProfileRequest,
    ) -> Result<Profile, AppError> {
        let full_name = req.full_name.as_deref().map(str::trim);
        if full_name.is_some_and(str::is_empty) {
            return Err(AppError::validation("Full name must not be empty"));
        }

        if let Some(company_id) = ctx.principal.company_id {
            self.policy.require(
                &ctx.principal,
                Table::CompanyUser,
                Action::Update,
                &RowScope::company(company_id).owned_by(ctx.user_id()),
            )?;

            let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
            CompanyUserRepository::update(
                &mut tx,
                ctx.principal.profile_id,
                &UpdateCompanyUser {
                    full_name: full_name.map(str::to_string),
                    job_title: None,
                    phone: req.phone.clone(),
                },
            )
            .await?;
            commit(tx).await?;
        } else if req.phone.is_some() {
            return Err(AppError::validation("Only company users have a phone number"));
        }

        if let Some(name) = full_name {
            self.users.update_full_name(ctx.user_id(), name).await?;
        }

        info!(user_id = %ctx.user_id(), "Profile updated");
        self.get(ctx).await
    }
}
