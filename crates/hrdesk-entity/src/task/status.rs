//! Task status and priority enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use hrdesk_core::AppError;

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    Todo,
    /// Being worked on.
    InProgress,
    /// Finished.
    Done,
    /// Abandoned.
    Cancelled,
}

impl TaskStatus {
    /// Whether a task may move from this status to `next`.
    ///
    /// A cancelled task can only be reopened as `todo`.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        if *self == next {
            return false;
        }
        match self {
            Self::Cancelled => next == Self::Todo,
            _ => true,
        }
    }

    /// Return the status as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(AppError::validation(format!(
                "Invalid task status: '{s}'. Expected one of: todo, in_progress, done, cancelled"
            ))),
        }
    }
}

/// Task priority.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Low priority.
    Low,
    /// Normal priority.
    #[default]
    Medium,
    /// High priority.
    High,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        assert!(TaskStatus::Todo.can_transition_to(TaskStatus::InProgress));
        assert!(TaskStatus::Done.can_transition_to(TaskStatus::InProgress));
        assert!(!TaskStatus::Done.can_transition_to(TaskStatus::Done));
        assert!(TaskStatus::Cancelled.can_transition_to(TaskStatus::Todo));
        assert!(!TaskStatus::Cancelled.can_transition_to(TaskStatus::Done));
    }

    #[test]
    fn test_parse() {
        assert_eq!("IN_PROGRESS".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert!("blocked".parse::<TaskStatus>().is_err());
    }
}
