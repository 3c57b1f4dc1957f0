//! Report repository over the three report tables.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use hrdesk_core::error::AppError;
use hrdesk_core::result::AppResult;
use hrdesk_core::types::pagination::{PageRequest, PageResponse};
use hrdesk_entity::report::{NewReport, Report, ReportDetails, ReportKind, ReportStatus};

use crate::db_err;

#[derive(Debug, FromRow)]
struct AccidentRow {
    id: Uuid,
    company_id: Uuid,
    submitted_by: Uuid,
    employee_id: Uuid,
    status: ReportStatus,
    occurred_on: NaiveDate,
    description: Option<String>,
    location: String,
    injury: Option<String>,
    witnesses: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct IllnessRow {
    id: Uuid,
    company_id: Uuid,
    submitted_by: Uuid,
    employee_id: Uuid,
    status: ReportStatus,
    occurred_on: NaiveDate,
    description: Option<String>,
    end_date: Option<NaiveDate>,
    doctor_note: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct DepartureRow {
    id: Uuid,
    company_id: Uuid,
    submitted_by: Uuid,
    employee_id: Uuid,
    status: ReportStatus,
    occurred_on: NaiveDate,
    description: Option<String>,
    reason: String,
    notice_given_on: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AccidentRow> for Report {
    fn from(r: AccidentRow) -> Self {
        Report {
            id: r.id,
            company_id: r.company_id,
            submitted_by: r.submitted_by,
            employee_id: r.employee_id,
            status: r.status,
            occurred_on: r.occurred_on,
            description: r.description,
            details: ReportDetails::Accident {
                location: r.location,
                injury: r.injury,
                witnesses: r.witnesses,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<IllnessRow> for Report {
    fn from(r: IllnessRow) -> Self {
        Report {
            id: r.id,
            company_id: r.company_id,
            submitted_by: r.submitted_by,
            employee_id: r.employee_id,
            status: r.status,
            occurred_on: r.occurred_on,
            description: r.description,
            details: ReportDetails::Illness {
                end_date: r.end_date,
                doctor_note: r.doctor_note,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<DepartureRow> for Report {
    fn from(r: DepartureRow) -> Self {
        Report {
            id: r.id,
            company_id: r.company_id,
            submitted_by: r.submitted_by,
            employee_id: r.employee_id,
            status: r.status,
            occurred_on: r.occurred_on,
            description: r.description,
            details: ReportDetails::Departure {
                reason: r.reason,
                notice_given_on: r.notice_given_on,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Fetch rows of `kind` with `sql` (which selects `*` from the kind's
/// table) and convert them to [`Report`]s.
async fn fetch_reports(
    conn: &mut PgConnection,
    kind: ReportKind,
    sql: &str,
    company_id: Option<Uuid>,
    page: &PageRequest,
) -> Result<Vec<Report>, sqlx::Error> {
    let limit = page.limit() as i64;
    let offset = page.offset() as i64;
    Ok(match kind {
        ReportKind::Accident => sqlx::query_as::<_, AccidentRow>(sql)
            .bind(company_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(conn)
            .await?
            .into_iter()
            .map(Report::from)
            .collect(),
        ReportKind::Illness => sqlx::query_as::<_, IllnessRow>(sql)
            .bind(company_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(conn)
            .await?
            .into_iter()
            .map(Report::from)
            .collect(),
        ReportKind::Departure => sqlx::query_as::<_, DepartureRow>(sql)
            .bind(company_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(conn)
            .await?
            .into_iter()
            .map(Report::from)
            .collect(),
    })
}

/// Fetch at most one row of `kind` with `sql`, binding `id` as `$1` and,
/// when given, `status` as `$2`.
async fn fetch_one_report(
    conn: &mut PgConnection,
    kind: ReportKind,
    sql: &str,
    id: Uuid,
    status: Option<ReportStatus>,
) -> Result<Option<Report>, sqlx::Error> {
    Ok(match kind {
        ReportKind::Accident => {
            let mut query = sqlx::query_as::<_, AccidentRow>(sql).bind(id);
            if let Some(status) = status {
                query = query.bind(status);
            }
            query.fetch_optional(conn).await?.map(Report::from)
        }
        ReportKind::Illness => {
            let mut query = sqlx::query_as::<_, IllnessRow>(sql).bind(id);
            if let Some(status) = status {
                query = query.bind(status);
            }
            query.fetch_optional(conn).await?.map(Report::from)
        }
        ReportKind::Departure => {
            let mut query = sqlx::query_as::<_, DepartureRow>(sql).bind(id);
            if let Some(status) = status {
                query = query.bind(status);
            }
            query.fetch_optional(conn).await?.map(Report::from)
        }
    })
}

/// Queries over `accident_reports`, `illness_reports` and `departure_reports`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportRepository;

impl ReportRepository {
    /// List visible reports of one kind, newest first.
    pub async fn find_all(
        conn: &mut PgConnection,
        kind: ReportKind,
        company_id: Option<Uuid>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Report>> {
        let table = kind.table_name();
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {table} WHERE ($1::uuid IS NULL OR company_id = $1)"
        ))
        .bind(company_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to count reports"))?;

        let sql = format!(
            "SELECT * FROM {table} WHERE ($1::uuid IS NULL OR company_id = $1) \
             ORDER BY occurred_on DESC, created_at DESC LIMIT $2 OFFSET $3"
        );
        let reports = fetch_reports(conn, kind, &sql, company_id, page)
            .await
            .map_err(db_err("Failed to list reports"))?;

        Ok(PageResponse::new(
            reports,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Find a report by kind and ID.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        kind: ReportKind,
        id: Uuid,
    ) -> AppResult<Option<Report>> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", kind.table_name());
        fetch_one_report(conn, kind, &sql, id, None)
            .await
            .map_err(db_err("Failed to find report"))
    }

    /// Change the review status of a report.
    pub async fn update_status(
        conn: &mut PgConnection,
        kind: ReportKind,
        id: Uuid,
        status: ReportStatus,
    ) -> AppResult<Report> {
        let sql = format!(
            "UPDATE {} SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
            kind.table_name()
        );
        fetch_one_report(conn, kind, &sql, id, Some(status))
            .await
            .map_err(db_err("Failed to update report status"))?
            .ok_or_else(|| AppError::not_found(format!("{kind} report {id} not found")))
    }

    /// File a report in the table matching its details.
    pub async fn create(conn: &mut PgConnection, data: &NewReport) -> AppResult<Report> {
        let report = match &data.details {
            ReportDetails::Accident {
                location,
                injury,
                witnesses,
            } => sqlx::query_as::<_, AccidentRow>(
                "INSERT INTO accident_reports \
                 (company_id, submitted_by, employee_id, occurred_on, description, location, injury, witnesses) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
            )
            .bind(data.company_id)
            .bind(data.submitted_by)
            .bind(data.employee_id)
            .bind(data.occurred_on)
            .bind(&data.description)
            .bind(location)
            .bind(injury)
            .bind(witnesses)
            .fetch_one(conn)
            .await
            .map(Report::from),
            ReportDetails::Illness {
                end_date,
                doctor_note,
            } => sqlx::query_as::<_, IllnessRow>(
                "INSERT INTO illness_reports \
                 (company_id, submitted_by, employee_id, occurred_on, description, end_date, doctor_note) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
            )
            .bind(data.company_id)
            .bind(data.submitted_by)
            .bind(data.employee_id)
            .bind(data.occurred_on)
            .bind(&data.description)
            .bind(end_date)
            .bind(doctor_note)
            .fetch_one(conn)
            .await
            .map(Report::from),
            ReportDetails::Departure {
                reason,
                notice_given_on,
            } => sqlx::query_as::<_, DepartureRow>(
                "INSERT INTO departure_reports \
                 (company_id, submitted_by, employee_id, occurred_on, description, reason, notice_given_on) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
            )
            .bind(data.company_id)
            .bind(data.submitted_by)
            .bind(data.employee_id)
            .bind(data.occurred_on)
            .bind(&data.description)
            .bind(reason)
            .bind(notice_given_on)
            .fetch_one(conn)
            .await
            .map(Report::from),
        };
        report.map_err(db_err("Failed to file report"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illness_row_maps_to_illness_details() {
        let now = Utc::now();
        let row = IllnessRow {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            submitted_by: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            status: ReportStatus::Reviewed,
            occurred_on: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
            description: Some("Flu".to_string()),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 16),
            doctor_note: true,
            created_at: now,
            updated_at: now,
        };
        let report = Report::from(row);
        assert_eq!(report.kind(), ReportKind::Illness);
        assert_eq!(report.status, ReportStatus::Reviewed);
        assert!(matches!(
            report.details,
            ReportDetails::Illness {
                doctor_note: true,
                ..
            }
        ));
    }
}
