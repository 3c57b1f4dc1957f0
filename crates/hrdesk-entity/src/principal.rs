//! The resolved identity a request runs as.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hrdesk_core::AppError;

use crate::role::Role;

/// A signed-in user together with the role resolved from the profile tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User ID.
    pub user_id: Uuid,
    /// Sign-in e-mail.
    pub email: String,
    /// Resolved role.
    pub role: Role,
    /// Company for company admins and employees.
    pub company_id: Option<Uuid>,
    /// ID of the `admin` or `company_user` row the role came from.
    pub profile_id: Uuid,
}

impl Principal {
    /// Whether this principal is a super admin.
    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    /// Whether this principal is a member of `company_id`.
    pub fn belongs_to(&self, company_id: Uuid) -> bool {
        self.company_id == Some(company_id)
    }

    /// The principal's company, or an authorization error for principals
    /// without one.
    pub fn require_company(&self) -> Result<Uuid, AppError> {
        self.company_id
            .ok_or_else(|| AppError::authorization("This account is not attached to a company"))
    }
}
