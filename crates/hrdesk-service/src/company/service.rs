//! Company CRUD with policy enforcement.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use hrdesk_auth::policy::{Action, PolicyEnforcer, RowScope, Table};
use hrdesk_core::error::AppError;
use hrdesk_core::types::{PageRequest, PageResponse};
use hrdesk_database::repositories::CompanyRepository;
use hrdesk_database::{begin_scoped, commit};
use hrdesk_entity::company::{Company, CreateCompany, UpdateCompany};

use crate::activity::log_activity;
use crate::context::RequestContext;

/// Manages companies.
#[derive(Debug, Clone)]
pub struct CompanyService {
    pool: PgPool,
    policy: Arc<PolicyEnforcer>,
}

impl CompanyService {
    /// Creates a new company service.
    pub fn new(pool: PgPool, policy: Arc<PolicyEnforcer>) -> Self {
        Self { pool, policy }
    }

    /// Lists the companies visible to the caller.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<PageResponse<Company>, AppError> {
        self.policy
            .require_listing(&ctx.principal, Table::Company, None)?;

        let page = page.normalized();
        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let companies = CompanyRepository::find_all(&mut tx, &page).await?;
        commit(tx).await?;
        Ok(companies)
    }

    /// Gets a company by ID.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Company, AppError> {
        self.policy.require(
            &ctx.principal,
            Table::Company,
            Action::Select,
            &RowScope::company(id),
        )?;

        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let company = CompanyRepository::find_by_id(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Company {id} not found")))?;
        commit(tx).await?;
        Ok(company)
    }

    /// Creates a company.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        data: CreateCompany,
    ) -> Result<Company, AppError> {
        self.policy.require(
            &ctx.principal,
            Table::Company,
            Action::Insert,
            &RowScope::default(),
        )?;
        if data.name.trim().is_empty() {
            return Err(AppError::validation("Company name must not be empty"));
        }

        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let company = CompanyRepository::create(&mut tx, &data).await?;
        log_activity(
            &mut tx,
            ctx,
            Some(company.id),
            "company.created",
            "company",
            company.id,
        )
        .await?;
        commit(tx).await?;

        info!(
            user_id = %ctx.user_id(),
            company_id = %company.id,
            name = %company.name,
            "Company created"
        );
        Ok(company)
    }

    /// Updates company details.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        data: UpdateCompany,
    ) -> Result<Company, AppError> {
        self.policy.require(
            &ctx.principal,
            Table::Company,
            Action::Update,
            &RowScope::company(id),
        )?;
        if data.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::validation("Company name must not be empty"));
        }

        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let company = CompanyRepository::update(&mut tx, id, &data).await?;
        log_activity(&mut tx, ctx, Some(id), "company.updated", "company", id).await?;
        commit(tx).await?;

        info!(user_id = %ctx.user_id(), company_id = %id, "Company updated");
        Ok(company)
    }

    /// Activates or deactivates a company. Only callers allowed to delete a
    /// company may change whether it is active.
    pub async fn set_active(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        active: bool,
    ) -> Result<Company, AppError> {
        self.policy.require(
            &ctx.principal,
            Table::Company,
            Action::Delete,
            &RowScope::company(id),
        )?;

        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let company = CompanyRepository::set_active(&mut tx, id, active).await?;
        let action = if active {
            "company.activated"
        } else {
            "company.deactivated"
        };
        log_activity(&mut tx, ctx, Some(id), action, "company", id).await?;
        commit(tx).await?;

        info!(user_id = %ctx.user_id(), company_id = %id, active, "Company status changed");
        Ok(company)
    }
}
