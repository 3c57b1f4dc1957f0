//! Activity log repository.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use hrdesk_core::result::AppResult;
use hrdesk_core::types::pagination::{PageRequest, PageResponse};
use hrdesk_entity::activity::{ActivityLog, ArchivedActivityLog, NewActivity};

use crate::db_err;

const FILTER: &str = "($1::uuid IS NULL OR company_id = $1) AND ($2::uuid IS NULL OR user_id = $2)";

/// Queries over `activity_logs` and `activity_logs_archive`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityRepository;

impl ActivityRepository {
    /// Append an entry.
    pub async fn record(conn: &mut PgConnection, entry: &NewActivity) -> AppResult<ActivityLog> {
        sqlx::query_as::<_, ActivityLog>(
            "INSERT INTO activity_logs (company_id, user_id, action, entity_type, entity_id, details) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(entry.company_id)
        .bind(entry.user_id)
        .bind(&entry.action)
        .bind(&entry.entity_type)
        .bind(entry.entity_id)
        .bind(&entry.details)
        .fetch_one(conn)
        .await
        .map_err(db_err("Failed to record activity"))
    }

    /// List visible entries, newest first.
    pub async fn find_all(
        conn: &mut PgConnection,
        company_id: Option<Uuid>,
        user_id: Option<Uuid>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ActivityLog>> {
        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM activity_logs WHERE {FILTER}"))
                .bind(company_id)
                .bind(user_id)
                .fetch_one(&mut *conn)
                .await
                .map_err(db_err("Failed to count activity"))?;

        let entries = sqlx::query_as::<_, ActivityLog>(&format!(
            "SELECT * FROM activity_logs WHERE {FILTER} \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(company_id)
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list activity"))?;

        Ok(PageResponse::new(
            entries,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// List archived entries, newest first.
    pub async fn find_archived(
        conn: &mut PgConnection,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ArchivedActivityLog>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_logs_archive")
            .fetch_one(&mut *conn)
            .await
            .map_err(db_err("Failed to count archived activity"))?;

        let entries = sqlx::query_as::<_, ArchivedActivityLog>(
            "SELECT * FROM activity_logs_archive ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list archived activity"))?;

        Ok(PageResponse::new(
            entries,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Move every entry created before `cutoff` into the archive table.
    /// Returns the number of entries moved.
    pub async fn archive_before(conn: &mut PgConnection, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "WITH moved AS ( \
                 DELETE FROM activity_logs WHERE created_at < $1 RETURNING * \
             ) \
             INSERT INTO activity_logs_archive \
                 (id, company_id, user_id, action, entity_type, entity_id, details, created_at) \
             SELECT id, company_id, user_id, action, entity_type, entity_id, details, created_at \
             FROM moved",
        )
        .bind(cutoff)
        .execute(conn)
        .await
        .map_err(db_err("Failed to archive activity"))?;
        Ok(result.rows_affected())
    }
}
