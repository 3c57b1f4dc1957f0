//! Super-admin profile row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row of the `admin` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminProfile {
    /// Profile ID.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Display name.
    pub full_name: Option<String>,
    /// Raw role string.
    pub role: String,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}
