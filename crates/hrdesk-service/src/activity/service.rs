//! Activity log service.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use hrdesk_auth::policy::{Action, PolicyEnforcer, RowScope, Table};
use hrdesk_core::error::AppError;
use hrdesk_core::types::{PageRequest, PageResponse};
use hrdesk_database::repositories::ActivityRepository;
use hrdesk_database::{begin_scoped, commit};
use hrdesk_entity::activity::{ActivityLog, ArchivedActivityLog, NewActivity};

use crate::context::RequestContext;

/// Record an entry for the caller inside an open transaction.
pub(crate) async fn log_activity(
    conn: &mut PgConnection,
    ctx: &RequestContext,
    company_id: Option<Uuid>,
    action: &str,
    entity_type: &str,
    entity_id: Uuid,
) -> Result<ActivityLog, AppError> {
    let mut entry = NewActivity::new(
        ctx.user_id(),
        company_id,
        action,
        entity_type,
        Some(entity_id),
    );
    if let Some(ip) = &ctx.ip_address {
        entry = entry.with_details(json!({ "ip_address": ip }));
    }
    ActivityRepository::record(conn, &entry).await
}

/// Request to record an activity entry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RecordActivityRequest {
    /// Company the entry belongs to (defaults to the caller's).
    pub company_id: Option<Uuid>,
    /// What happened, e.g. `task.viewed`.
    pub action: String,
    /// Kind of entity involved.
    pub entity_type: String,
    /// Entity involved.
    pub entity_id: Option<Uuid>,
    /// Free-form details.
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// Reads and archives the activity log.
#[derive(Debug, Clone)]
pub struct ActivityService {
    pool: PgPool,
    policy: Arc<PolicyEnforcer>,
}

impl ActivityService {
    /// Creates a new activity service.
    pub fn new(pool: PgPool, policy: Arc<PolicyEnforcer>) -> Self {
        Self { pool, policy }
    }

    /// Records an entry on behalf of the caller.
    pub async fn record(
        &self,
        ctx: &RequestContext,
        req: RecordActivityRequest,
    ) -> Result<ActivityLog, AppError> {
        if req.action.trim().is_empty() || req.entity_type.trim().is_empty() {
            return Err(AppError::validation("action and entity_type are required"));
        }
        let company_id = req.company_id.or(ctx.principal.company_id);
        if let Some(id) = company_id {
            if !ctx.is_super_admin() && !ctx.principal.belongs_to(id) {
                return Err(AppError::authorization(
                    "Activity can only be recorded for your own company",
                ));
            }
        }

        let scope = RowScope {
            company_id,
            owner_id: Some(ctx.user_id()),
            assignee_id: None,
        };
        self.policy
            .require(&ctx.principal, Table::ActivityLog, Action::Insert, &scope)?;

        let mut entry = NewActivity::new(
            ctx.user_id(),
            company_id,
            req.action,
            req.entity_type,
            req.entity_id,
        );
        if let Some(details) = req.details {
            entry = entry.with_details(details);
        }

        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let logged = ActivityRepository::record(&mut tx, &entry).await?;
        commit(tx).await?;
        Ok(logged)
    }

    /// Lists visible entries, optionally narrowed to a company or user.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        company_id: Option<Uuid>,
        user_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<PageResponse<ActivityLog>, AppError> {
        self.policy
            .require_listing(&ctx.principal, Table::ActivityLog, company_id)?;

        let page = page.normalized();
        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let entries = ActivityRepository::find_all(&mut tx, company_id, user_id, &page).await?;
        commit(tx).await?;
        Ok(entries)
    }

    /// Lists archived entries.
    pub async fn list_archived(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<PageResponse<ArchivedActivityLog>, AppError> {
        self.policy
            .require_listing(&ctx.principal, Table::ActivityArchive, None)?;

        let page = page.normalized();
        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let entries = ActivityRepository::find_archived(&mut tx, &page).await?;
        commit(tx).await?;
        Ok(entries)
    }

    /// Moves entries older than `days` days into the archive in one
    /// transaction. Returns the number of entries moved.
    pub async fn archive_older_than(&self, ctx: &RequestContext, days: u32) -> Result<u64, AppError> {
        if days == 0 {
            return Err(AppError::validation("days must be at least 1"));
        }
        self.policy.require(
            &ctx.principal,
            Table::ActivityArchive,
            Action::Insert,
            &RowScope::default(),
        )?;

        let cutoff = Utc::now() - Duration::days(i64::from(days));
        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let moved = ActivityRepository::archive_before(&mut tx, cutoff).await?;
        commit(tx).await?;

        info!(user_id = %ctx.user_id(), days, moved, "Activity log archived");
        Ok(moved)
    }
}
