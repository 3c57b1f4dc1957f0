//! Employee management: listing, invitations, profile and role changes,
//! deactivation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use hrdesk_auth::AuthManager;
use hrdesk_auth::policy::{Action, PolicyEnforcer, RowScope, Table};
use hrdesk_core::error::AppError;
use hrdesk_core::types::{PageRequest, PageResponse};
use hrdesk_database::UserRepository;
use hrdesk_database::repositories::{CompanyRepository, CompanyUserRepository};
use hrdesk_database::{begin_scoped, commit};
use hrdesk_entity::Role;
use hrdesk_entity::role::{CompanyUser, CreateCompanyUser, EmployeeView, UpdateCompanyUser};
use hrdesk_entity::user::UserStatus;

use crate::activity::log_activity;
use crate::context::RequestContext;

/// Request to add an employee to a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmployeeRequest {
    /// Target company; defaults to the caller's.
    pub company_id: Option<Uuid>,
    /// Sign-in e-mail of the new account.
    pub email: String,
    /// Full name.
    pub full_name: String,
    /// Job title.
    pub job_title: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// `company_admin` or `employee`.
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Employee
}

/// Result of adding an employee.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedEmployee {
    /// The new employee.
    pub employee: EmployeeView,
    /// Whether the invitation e-mail went out.
    pub invitation_sent: bool,
}

/// Manages the `company_user` rows and their accounts.
#[derive(Debug, Clone)]
pub struct EmployeeService {
    pool: PgPool,
    policy: Arc<PolicyEnforcer>,
    auth: Arc<AuthManager>,
    users: UserRepository,
}

impl EmployeeService {
    /// Creates a new employee service.
    pub fn new(pool: PgPool, policy: Arc<PolicyEnforcer>, auth: Arc<AuthManager>) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            pool,
            policy,
            auth,
        }
    }

    /// Lists the employees of a company.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        company_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<PageResponse<EmployeeView>, AppError> {
        let company_id = ctx.target_company(company_id)?;
        self.policy
            .require_listing(&ctx.principal, Table::CompanyUser, Some(company_id))?;

        let page = page.normalized();
        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let employees = CompanyUserRepository::find_by_company(&mut tx, company_id, &page).await?;
        commit(tx).await?;
        Ok(employees)
    }

    /// Gets an employee by `company_user` ID.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<EmployeeView, AppError> {
        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let employee = CompanyUserRepository::find_view(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Employee {id} not found")))?;
        commit(tx).await?;

        self.policy.require(
            &ctx.principal,
            Table::CompanyUser,
            Action::Select,
            &RowScope::company(employee.company_id).owned_by(employee.user_id),
        )?;
        Ok(employee)
    }

    /// Creates an account with an unknown password, attaches it to the
    /// company and e-mails a set-password link.
    ///
    /// If attaching fails the account is removed again. A failed invitation
    /// e-mail does not undo the employee; a normal password reset recovers.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateEmployeeRequest,
    ) -> Result<CreatedEmployee, AppError> {
        let company_id = ctx.target_company(req.company_id)?;
        self.policy.require(
            &ctx.principal,
            Table::CompanyUser,
            Action::Insert,
            &RowScope::company(company_id),
        )?;
        if req.role.company_row_value().is_none() {
            return Err(AppError::validation(format!(
                "Role '{}' cannot be held in a company",
                req.role
            )));
        }
        if req.full_name.trim().is_empty() {
            return Err(AppError::validation("Full name must not be empty"));
        }

        let company = {
            let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
            let company = CompanyRepository::find_by_id(&mut tx, company_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Company {company_id} not found")))?;
            commit(tx).await?;
            company
        };
        if !company.is_active {
            return Err(AppError::validation("Company is deactivated"));
        }

        let user = self
            .auth
            .create_invited_account(&req.email, req.full_name.trim())
            .await?;

        let attached = self
            .attach(ctx, &req, user.id, company_id)
            .await;
        let employee = match attached {
            Ok(employee) => employee,
            Err(e) => {
                error!(user_id = %user.id, error = %e, "Attaching employee failed, removing account");
                if let Err(cleanup) = self.auth.remove_account(user.id).await {
                    error!(user_id = %user.id, error = %cleanup, "Failed to remove account");
                }
                return Err(e);
            }
        };

        let invitation_sent = match self.auth.send_invitation(&user, &company.name).await {
            Ok(()) => true,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Invitation e-mail failed");
                false
            }
        };

        info!(
            user_id = %ctx.user_id(),
            employee_id = %employee.id,
            company_id = %company_id,
            role = %req.role,
            "Employee created"
        );
        Ok(CreatedEmployee {
            employee,
            invitation_sent,
        })
    }

    async fn attach(
        &self,
        ctx: &RequestContext,
        req: &CreateEmployeeRequest,
        user_id: Uuid,
        company_id: Uuid,
    ) -> Result<EmployeeView, AppError> {
        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let member = CompanyUserRepository::create(
            &mut tx,
            &CreateCompanyUser {
                user_id,
                company_id,
                full_name: req.full_name.clone(),
                job_title: req.job_title.clone(),
                phone: req.phone.clone(),
                role: req.role,
            },
        )
        .await?;
        log_activity(
            &mut tx,
            ctx,
            Some(company_id),
            "employee.created",
            "company_user",
            member.id,
        )
        .await?;
        let view = CompanyUserRepository::find_view(&mut tx, member.id)
            .await?
            .ok_or_else(|| AppError::internal("Created employee is not visible"))?;
        commit(tx).await?;
        Ok(view)
    }

    /// Updates an employee's profile fields.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        data: UpdateCompanyUser,
    ) -> Result<CompanyUser, AppError> {
        if data.full_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::validation("Full name must not be empty"));
        }

        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let member = self.find_member(&mut tx, id).await?;
        self.policy.require(
            &ctx.principal,
            Table::CompanyUser,
            Action::Update,
            &RowScope::company(member.company_id).owned_by(member.user_id),
        )?;

        let updated = CompanyUserRepository::update(&mut tx, id, &data).await?;
        log_activity(
            &mut tx,
            ctx,
            Some(member.company_id),
            "employee.updated",
            "company_user",
            id,
        )
        .await?;
        commit(tx).await?;
        Ok(updated)
    }

    /// Changes an employee's role within the company.
    pub async fn change_role(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        role: Role,
    ) -> Result<CompanyUser, AppError> {
        let role_value = role.company_row_value().ok_or_else(|| {
            AppError::validation(format!("Role '{role}' cannot be held in a company"))
        })?;

        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let member = self.find_member(&mut tx, id).await?;
        // Role changes are a company-level action; owning the row is not enough.
        self.policy.require(
            &ctx.principal,
            Table::CompanyUser,
            Action::Update,
            &RowScope::company(member.company_id),
        )?;
        if member.user_id == ctx.user_id() {
            return Err(AppError::validation("You cannot change your own role"));
        }

        let updated = CompanyUserRepository::update_role(&mut tx, id, role_value).await?;
        log_activity(
            &mut tx,
            ctx,
            Some(member.company_id),
            "employee.role_changed",
            "company_user",
            id,
        )
        .await?;
        commit(tx).await?;

        info!(
            user_id = %ctx.user_id(),
            employee_id = %id,
            role = %role,
            "Employee role changed"
        );
        Ok(updated)
    }

    /// Activates or deactivates the account behind an employee.
    pub async fn set_active(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        active: bool,
    ) -> Result<EmployeeView, AppError> {
        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let member = self.find_member(&mut tx, id).await?;
        self.policy.require(
            &ctx.principal,
            Table::CompanyUser,
            Action::Delete,
            &RowScope::company(member.company_id),
        )?;
        if member.user_id == ctx.user_id() {
            return Err(AppError::validation("You cannot deactivate yourself"));
        }
        commit(tx).await?;

        let status = if active {
            UserStatus::Active
        } else {
            UserStatus::Inactive
        };
        self.users.update_status(member.user_id, status).await?;

        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let action = if active {
            "employee.activated"
        } else {
            "employee.deactivated"
        };
        log_activity(&mut tx, ctx, Some(member.company_id), action, "company_user", id).await?;
        let view = CompanyUserRepository::find_view(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Employee {id} not found")))?;
        commit(tx).await?;

        info!(user_id = %ctx.user_id(), employee_id = %id, %status, "Employee status changed");
        Ok(view)
    }

    async fn find_member(
        &self,
        conn: &mut sqlx::PgConnection,
        id: Uuid,
    ) -> Result<CompanyUser, AppError> {
        CompanyUserRepository::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Employee {id} not found")))
    }
}
