//! Activity log models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An entry of `activity_logs`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityLog {
    /// Entry ID.
    pub id: Uuid,
    /// Company the action happened in, if any.
    pub company_id: Option<Uuid>,
    /// Acting user.
    pub user_id: Uuid,
    /// Action name (e.g. `task.created`).
    pub action: String,
    /// Kind of entity acted on.
    pub entity_type: String,
    /// ID of the entity acted on.
    pub entity_id: Option<Uuid>,
    /// Free-form details.
    pub details: serde_json::Value,
    /// When the action happened.
    pub created_at: DateTime<Utc>,
}

/// An entry of `activity_logs_archive`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ArchivedActivityLog {
    /// Entry ID (kept from the live table).
    pub id: Uuid,
    /// Company the action happened in, if any.
    pub company_id: Option<Uuid>,
    /// Acting user.
    pub user_id: Uuid,
    /// Action name.
    pub action: String,
    /// Kind of entity acted on.
    pub entity_type: String,
    /// ID of the entity acted on.
    pub entity_id: Option<Uuid>,
    /// Free-form details.
    pub details: serde_json::Value,
    /// When the action happened.
    pub created_at: DateTime<Utc>,
    /// When the entry was moved to the archive.
    pub archived_at: DateTime<Utc>,
}

/// Data required to record an activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActivity {
    /// Company the action happened in.
    pub company_id: Option<Uuid>,
    /// Acting user.
    pub user_id: Uuid,
    /// Action name.
    pub action: String,
    /// Kind of entity acted on.
    pub entity_type: String,
    /// ID of the entity acted on.
    pub entity_id: Option<Uuid>,
    /// Free-form details.
    pub details: serde_json::Value,
}

impl NewActivity {
    /// Build an entry with empty details.
    pub fn new(
        user_id: Uuid,
        company_id: Option<Uuid>,
        action: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: Option<Uuid>,
    ) -> Self {
        Self {
            company_id,
            user_id,
            action: action.into(),
            entity_type: entity_type.into(),
            entity_id,
            details: serde_json::Value::Object(Default::default()),
        }
    }

    /// Attach details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}
