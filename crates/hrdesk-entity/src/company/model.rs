//! Company entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A tenant organisation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    /// Company ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Organisation number.
    pub org_number: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Contact e-mail.
    pub contact_email: Option<String>,
    /// Whether the company is active.
    pub is_active: bool,
    /// When the company was created.
    pub created_at: DateTime<Utc>,
    /// When the company was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompany {
    /// Display name.
    pub name: String,
    /// Organisation number.
    pub org_number: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Contact e-mail.
    pub contact_email: Option<String>,
}

/// Partial company update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCompany {
    /// New display name.
    pub name: Option<String>,
    /// New organisation number.
    pub org_number: Option<String>,
    /// New address.
    pub address: Option<String>,
    /// New contact e-mail.
    pub contact_email: Option<String>,
}
