//! Task comment repository.

use sqlx::PgConnection;
use uuid::Uuid;

use hrdesk_core::result::AppResult;
use hrdesk_entity::task::{CreateTaskComment, TaskComment};

use crate::db_err;

/// Queries over the `task_comments` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskCommentRepository;

impl TaskCommentRepository {
    /// All comments of a task, oldest first.
    pub async fn find_by_task(
        conn: &mut PgConnection,
        task_id: Uuid,
    ) -> AppResult<Vec<TaskComment>> {
        sqlx::query_as::<_, TaskComment>(
            "SELECT * FROM task_comments WHERE task_id = $1 ORDER BY created_at ASC",
        )
        .bind(task_id)
        .fetch_all(conn)
        .await
        .map_err(db_err("Failed to list comments"))
    }

    /// Find a comment by ID.
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<TaskComment>> {
        sqlx::query_as::<_, TaskComment>("SELECT * FROM task_comments WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(db_err("Failed to find comment"))
    }

    /// Post a comment.
    pub async fn create(
        conn: &mut PgConnection,
        data: &CreateTaskComment,
    ) -> AppResult<TaskComment> {
        sqlx::query_as::<_, TaskComment>(
            "INSERT INTO task_comments (task_id, author_id, body) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(data.task_id)
        .bind(data.author_id)
        .bind(data.body.trim())
        .fetch_one(conn)
        .await
        .map_err(db_err("Failed to create comment"))
    }

    /// Delete a comment.
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM task_comments WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .map_err(db_err("Failed to delete comment"))?;
        Ok(result.rows_affected() > 0)
    }
}
