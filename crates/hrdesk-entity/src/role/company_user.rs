//! Company membership (employee profile) rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use hrdesk_core::AppError;

use super::role::Role;
use crate::user::UserStatus;

/// A row of the `company_user` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyUser {
    /// Profile ID.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Company the user belongs to.
    pub company_id: Uuid,
    /// Display name.
    pub full_name: String,
    /// Job title.
    pub job_title: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Raw role string (`admin` or `employee`).
    pub role: String,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}

impl CompanyUser {
    /// Map the stored role string to an application role.
    pub fn app_role(&self) -> Result<Role, AppError> {
        Role::from_company_row(&self.role)
    }
}

/// Data required to add a user to a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompanyUser {
    /// User to attach.
    pub user_id: Uuid,
    /// Target company.
    pub company_id: Uuid,
    /// Display name.
    pub full_name: String,
    /// Job title.
    pub job_title: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Company role (`CompanyAdmin` or `Employee`).
    pub role: Role,
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCompanyUser {
    /// New display name.
    pub full_name: Option<String>,
    /// New job title.
    pub job_title: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
}

/// Company membership joined with the user's credentials row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmployeeView {
    /// Profile ID.
    pub id: Uuid,
    /// User ID.
    pub user_id: Uuid,
    /// Company ID.
    pub company_id: Uuid,
    /// Display name.
    pub full_name: String,
    /// Job title.
    pub job_title: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Raw role string.
    pub role: String,
    /// Sign-in e-mail.
    pub email: String,
    /// Account status.
    pub status: UserStatus,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}
