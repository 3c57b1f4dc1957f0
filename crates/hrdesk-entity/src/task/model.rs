//! Task entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::{TaskPriority, TaskStatus};

/// A task within a company.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Task ID.
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: Option<String>,
    /// Workflow status.
    pub status: TaskStatus,
    /// Priority.
    pub priority: TaskPriority,
    /// Assigned user.
    pub assigned_to: Option<Uuid>,
    /// User who created the task.
    pub created_by: Uuid,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owning company.
    pub company_id: Uuid,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: Option<String>,
    /// Priority.
    pub priority: TaskPriority,
    /// Assigned user.
    pub assigned_to: Option<Uuid>,
    /// Creator.
    pub created_by: Uuid,
    /// Due date.
    pub due_date: Option<NaiveDate>,
}

/// Partial task update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New priority.
    pub priority: Option<TaskPriority>,
    /// New assignee.
    pub assigned_to: Option<Uuid>,
    /// New due date.
    pub due_date: Option<NaiveDate>,
}

/// Filters accepted by task listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Only tasks in this status.
    pub status: Option<TaskStatus>,
    /// Only tasks assigned to this user.
    pub assigned_to: Option<Uuid>,
}
