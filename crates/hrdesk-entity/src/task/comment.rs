//! Task comment model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A comment on a task.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskComment {
    /// Comment ID.
    pub id: Uuid,
    /// Task the comment belongs to.
    pub task_id: Uuid,
    /// Author user ID.
    pub author_id: Uuid,
    /// Comment text.
    pub body: String,
    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
}

/// Data required to post a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskComment {
    /// Target task.
    pub task_id: Uuid,
    /// Author user ID.
    pub author_id: Uuid,
    /// Comment text.
    pub body: String,
}
