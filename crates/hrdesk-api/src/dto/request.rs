//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use hrdesk_auth::SignUp;
use hrdesk_entity::Role;
use hrdesk_entity::company::{CreateCompany, UpdateCompany};
use hrdesk_entity::report::ReportStatus;
use hrdesk_entity::task::{TaskFilter, TaskStatus};

/// Sign-in request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignInRequest {
    /// E-mail address.
    #[validate(length(min = 1, message = "is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Self-registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignUpRequest {
    /// E-mail address.
    #[validate(email(message = "must be a valid e-mail address"))]
    pub email: String,
    /// Password; strength is checked by the auth layer.
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
    /// Display name.
    #[validate(length(max = 200))]
    pub full_name: Option<String>,
    /// Company to create with the account as its admin. Accounts without a
    /// company are created by invitation instead.
    #[validate(length(min = 1, max = 200, message = "is required"))]
    pub company_name: String,
}

impl From<SignUpRequest> for SignUp {
    fn from(req: SignUpRequest) -> Self {
        Self {
            email: req.email,
            password: req.password,
            full_name: req.full_name,
            company_name: req.company_name,
        }
    }
}

/// Password change request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 1, message = "is required"))]
    pub current_password: String,
    /// New password.
    #[validate(length(min = 1, message = "is required"))]
    pub new_password: String,
}

/// Request a password reset e-mail.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordResetRequest {
    /// Account e-mail.
    #[validate(length(min = 1, message = "is required"))]
    pub email: String,
}

/// Complete a password reset with the token from the e-mailed link.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConfirmPasswordResetRequest {
    /// Raw reset token.
    #[validate(length(min = 1, message = "is required"))]
    pub token: String,
    /// New password.
    #[validate(length(min = 1, message = "is required"))]
    pub new_password: String,
}

/// Create company request (super admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    /// Display name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Organisation number.
    #[validate(length(max = 50))]
    pub org_number: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Contact e-mail.
    #[validate(email)]
    pub contact_email: Option<String>,
}

impl From<CreateCompanyRequest> for CreateCompany {
    fn from(req: CreateCompanyRequest) -> Self {
        Self {
            name: req.name,
            org_number: req.org_number,
            address: req.address,
            contact_email: req.contact_email,
        }
    }
}

/// Update company request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCompanyRequest {
    /// New display name.
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    /// New organisation number.
    #[validate(length(max = 50))]
    pub org_number: Option<String>,
    /// New address.
    pub address: Option<String>,
    /// New contact e-mail.
    #[validate(email)]
    pub contact_email: Option<String>,
}

impl From<UpdateCompanyRequest> for UpdateCompany {
    fn from(req: UpdateCompanyRequest) -> Self {
        Self {
            name: req.name,
            org_number: req.org_number,
            address: req.address,
            contact_email: req.contact_email,
        }
    }
}

/// Activate or deactivate a company or an employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetActiveRequest {
    /// Target state.
    pub active: bool,
}

/// Change an employee's company role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRoleRequest {
    /// `company_admin` or `employee`.
    pub role: Role,
}

/// Move a task to another status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeTaskStatusRequest {
    /// Target status.
    pub status: TaskStatus,
}

/// Move a report to another status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeReportStatusRequest {
    /// Target status.
    pub status: ReportStatus,
}

/// Add a comment to a task.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddCommentRequest {
    /// Comment text.
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
}

/// Move old activity entries to the archive.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ArchiveActivityRequest {
    /// Entries older than this many days are archived.
    #[validate(range(min = 1, max = 3650))]
    pub older_than_days: u32,
}

/// `?company_id=` filter used by company-scoped listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyQuery {
    /// Target company; defaults to the caller's.
    pub company_id: Option<Uuid>,
}

/// Task listing filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskListQuery {
    /// Target company.
    pub company_id: Option<Uuid>,
    /// Only tasks in this status.
    pub status: Option<TaskStatus>,
    /// Only tasks assigned to this user.
    pub assigned_to: Option<Uuid>,
}

impl TaskListQuery {
    /// The filter part of the query.
    pub fn filter(&self) -> TaskFilter {
        TaskFilter {
            status: self.status,
            assigned_to: self.assigned_to,
        }
    }
}

/// Activity listing filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityQuery {
    /// Only entries of this company.
    pub company_id: Option<Uuid>,
    /// Only entries by this user.
    pub user_id: Option<Uuid>,
}
