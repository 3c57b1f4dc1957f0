//! Task repository.

use sqlx::PgConnection;
use uuid::Uuid;

use hrdesk_core::error::AppError;
use hrdesk_core::result::AppResult;
use hrdesk_core::types::pagination::{PageRequest, PageResponse};
use hrdesk_entity::task::{CreateTask, Task, TaskFilter, TaskStatus, UpdateTask};

use crate::db_err;

const FILTER: &str = "($1::uuid IS NULL OR company_id = $1) \
                      AND ($2::task_status IS NULL OR status = $2) \
                      AND ($3::uuid IS NULL OR assigned_to = $3)";

/// Queries over the `tasks` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskRepository;

impl TaskRepository {
    /// List visible tasks, optionally narrowed to one company.
    pub async fn find_all(
        conn: &mut PgConnection,
        company_id: Option<Uuid>,
        filter: &TaskFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Task>> {
        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM tasks WHERE {FILTER}"))
            .bind(company_id)
            .bind(filter.status)
            .bind(filter.assigned_to)
            .fetch_one(&mut *conn)
            .await
            .map_err(db_err("Failed to count tasks"))?;

        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT * FROM tasks WHERE {FILTER} \
             ORDER BY due_date ASC NULLS LAST, created_at DESC LIMIT $4 OFFSET $5"
        ))
        .bind(company_id)
        .bind(filter.status)
        .bind(filter.assigned_to)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list tasks"))?;

        Ok(PageResponse::new(
            tasks,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Find a task by ID.
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<Task>> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(db_err("Failed to find task"))
    }

    /// Create a task.
    pub async fn create(conn: &mut PgConnection, data: &CreateTask) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (company_id, title, description, priority, assigned_to, created_by, due_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(data.company_id)
        .bind(data.title.trim())
        .bind(&data.description)
        .bind(data.priority)
        .bind(data.assigned_to)
        .bind(data.created_by)
        .bind(data.due_date)
        .fetch_one(conn)
        .await
        .map_err(db_err("Failed to create task"))
    }

    /// Apply a partial update.
    pub async fn update(conn: &mut PgConnection, id: Uuid, data: &UpdateTask) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(
            "UPDATE tasks SET title = COALESCE($2, title), \
                              description = COALESCE($3, description), \
                              priority = COALESCE($4, priority), \
                              assigned_to = COALESCE($5, assigned_to), \
                              due_date = COALESCE($6, due_date), \
                              updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.priority)
        .bind(data.assigned_to)
        .bind(data.due_date)
        .fetch_optional(conn)
        .await
        .map_err(db_err("Failed to update task"))?
        .ok_or_else(|| AppError::not_found(format!("Task {id} not found")))
    }

    /// Set the workflow status.
    pub async fn update_status(
        conn: &mut PgConnection,
        id: Uuid,
        status: TaskStatus,
    ) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(
            "UPDATE tasks SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(conn)
        .await
        .map_err(db_err("Failed to update task status"))?
        .ok_or_else(|| AppError::not_found(format!("Task {id} not found")))
    }

    /// Delete a task and its comments.
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .map_err(db_err("Failed to delete task"))?;
        Ok(result.rows_affected() > 0)
    }
}
