//! Report submission, listing and review workflow.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use hrdesk_auth::policy::{Action, PolicyEnforcer, RowScope, Table};
use hrdesk_core::error::AppError;
use hrdesk_core::types::{PageRequest, PageResponse};
use hrdesk_database::repositories::ReportRepository;
use hrdesk_database::{begin_scoped, commit};
use hrdesk_entity::Role;
use hrdesk_entity::report::{NewReport, Report, ReportDetails, ReportKind, ReportStatus};

use crate::activity::log_activity;
use crate::context::{RequestContext, ensure_member};

/// Request to file a report. The kind is carried by `details`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReportRequest {
    /// Target company; defaults to the caller's.
    pub company_id: Option<Uuid>,
    /// User the report concerns; defaults to the caller.
    pub employee_id: Option<Uuid>,
    /// Day the event happened.
    pub occurred_on: NaiveDate,
    /// Free-text description.
    pub description: Option<String>,
    /// Kind-specific fields.
    #[serde(flatten)]
    pub details: ReportDetails,
}

fn report_scope(report: &Report) -> RowScope {
    RowScope::company(report.company_id)
        .owned_by(report.submitted_by)
        .assigned_to(Some(report.employee_id))
}

/// Validate the fields of a report before it is stored.
fn validate_report(req: &SubmitReportRequest, today: NaiveDate) -> Result<(), AppError> {
    if req.occurred_on > today {
        return Err(AppError::validation("occurred_on cannot be in the future"));
    }
    match &req.details {
        ReportDetails::Accident { location, .. } if location.trim().is_empty() => {
            Err(AppError::validation("Accident location must not be empty"))
        }
        ReportDetails::Illness {
            end_date: Some(end),
            ..
        } if *end < req.occurred_on => Err(AppError::validation(
            "Illness end date cannot be before it started",
        )),
        ReportDetails::Departure { reason, .. } if reason.trim().is_empty() => {
            Err(AppError::validation("Departure reason must not be empty"))
        }
        _ => Ok(()),
    }
}

/// Manages the three report tables.
#[derive(Debug, Clone)]
pub struct ReportService {
    pool: PgPool,
    policy: Arc<PolicyEnforcer>,
}

impl ReportService {
    /// Creates a new report service.
    pub fn new(pool: PgPool, policy: Arc<PolicyEnforcer>) -> Self {
        Self { pool, policy }
    }

    /// Lists visible reports of one kind.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        kind: ReportKind,
        company_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<PageResponse<Report>, AppError> {
        let company_id = match company_id {
            Some(id) => Some(id),
            None if ctx.is_super_admin() => None,
            None => Some(ctx.principal.require_company()?),
        };
        self.policy
            .require_listing(&ctx.principal, Table::Report, company_id)?;

        let page = page.normalized();
        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let reports = ReportRepository::find_all(&mut tx, kind, company_id, &page).await?;
        commit(tx).await?;
        Ok(reports)
    }

    /// Gets a report by kind and ID.
    pub async fn get(
        &self,
        ctx: &RequestContext,
        kind: ReportKind,
        id: Uuid,
    ) -> Result<Report, AppError> {
        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let report = ReportRepository::find_by_id(&mut tx, kind, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{kind} report {id} not found")))?;
        commit(tx).await?;

        self.policy.require(
            &ctx.principal,
            Table::Report,
            Action::Select,
            &report_scope(&report),
        )?;
        Ok(report)
    }

    /// Files a report. Employees file reports about themselves; admins may
    /// file for any employee of the company.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        req: SubmitReportRequest,
    ) -> Result<Report, AppError> {
        let company_id = ctx.target_company(req.company_id)?;
        self.policy.require(
            &ctx.principal,
            Table::Report,
            Action::Insert,
            &RowScope::company(company_id).owned_by(ctx.user_id()),
        )?;
        validate_report(&req, Utc::now().date_naive())?;

        let employee_id = req.employee_id.unwrap_or_else(|| ctx.user_id());
        if ctx.role() == Role::Employee && employee_id != ctx.user_id() {
            return Err(AppError::authorization(
                "Employees can only file reports about themselves",
            ));
        }

        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        if employee_id != ctx.user_id() || ctx.is_super_admin() {
            ensure_member(&mut tx, employee_id, company_id).await?;
        }

        let kind = req.details.kind();
        let report = ReportRepository::create(
            &mut tx,
            &NewReport {
                company_id,
                submitted_by: ctx.user_id(),
                employee_id,
                occurred_on: req.occurred_on,
                description: req.description,
                details: req.details,
            },
        )
        .await?;
        log_activity(
            &mut tx,
            ctx,
            Some(company_id),
            "report.submitted",
            kind.table_name(),
            report.id,
        )
        .await?;
        commit(tx).await?;

        info!(
            user_id = %ctx.user_id(),
            report_id = %report.id,
            company_id = %company_id,
            kind = %kind,
            "Report submitted"
        );
        Ok(report)
    }

    /// Moves a report forward through review.
    pub async fn change_status(
        &self,
        ctx: &RequestContext,
        kind: ReportKind,
        id: Uuid,
        status: ReportStatus,
    ) -> Result<Report, AppError> {
        let mut tx = begin_scoped(&self.pool, &ctx.principal).await?;
        let report = ReportRepository::find_by_id(&mut tx, kind, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{kind} report {id} not found")))?;
        self.policy.require(
            &ctx.principal,
            Table::Report,
            Action::Update,
            &RowScope::company(report.company_id),
        )?;
        if !report.status.can_transition_to(status) {
            return Err(AppError::validation(format!(
                "Cannot move report from {} to {}",
                report.status, status
            )));
        }

        let updated = ReportRepository::update_status(&mut tx, kind, id, status).await?;
        log_activity(
            &mut tx,
            ctx,
            Some(report.company_id),
            "report.status_changed",
            kind.table_name(),
            id,
        )
        .await?;
        commit(tx).await?;

        info!(
            user_id = %ctx.user_id(),
            report_id = %id,
            kind = %kind,
            to = %status,
            "Report status changed"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(details: ReportDetails, occurred_on: NaiveDate) -> SubmitReportRequest {
        SubmitReportRequest {
            company_id: None,
            employee_id: None,
            occurred_on,
            description: None,
            details,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_future_dates_rejected() {
        let req = request(
            ReportDetails::Illness {
                end_date: None,
                doctor_note: false,
            },
            day(2030, 1, 2),
        );
        assert!(validate_report(&req, day(2030, 1, 1)).is_err());
        assert!(validate_report(&req, day(2030, 1, 2)).is_ok());
    }

    #[test]
    fn test_illness_end_before_start_rejected() {
        let req = request(
            ReportDetails::Illness {
                end_date: Some(day(2024, 3, 1)),
                doctor_note: true,
            },
            day(2024, 3, 4),
        );
        assert!(validate_report(&req, day(2024, 6, 1)).is_err());
    }

    #[test]
    fn test_required_text_fields() {
        let accident = request(
            ReportDetails::Accident {
                location: "  ".to_string(),
                injury: None,
                witnesses: None,
            },
            day(2024, 3, 4),
        );
        assert!(validate_report(&accident, day(2024, 6, 1)).is_err());

        let departure = request(
            ReportDetails::Departure {
                reason: "New job".to_string(),
                notice_given_on: None,
            },
            day(2024, 3, 4),
        );
        assert!(validate_report(&departure, day(2024, 6, 1)).is_ok());
    }

    #[test]
    fn test_request_accepts_flat_json() {
        let req: SubmitReportRequest = serde_json::from_value(serde_json::json!({
            "occurred_on": "2024-03-04",
            "kind": "accident",
            "location": "Warehouse",
            "injury": "Cut finger"
        }))
        .unwrap();
        assert_eq!(req.details.kind(), ReportKind::Accident);
        assert!(req.company_id.is_none());
    }
}
