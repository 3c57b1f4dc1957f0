//! Application role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use hrdesk_core::AppError;

/// Role string stored in the `admin` table.
pub const ADMIN_TABLE_ROLE: &str = "superadmin";
/// Company-admin role string stored in `company_user.role`.
pub const COMPANY_ROLE_ADMIN: &str = "admin";
/// Employee role string stored in `company_user.role`.
pub const COMPANY_ROLE_EMPLOYEE: &str = "employee";

/// Permission tier of a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform operator with access to every company.
    SuperAdmin,
    /// Administrator of a single company.
    CompanyAdmin,
    /// Regular member of a company.
    Employee,
}

impl Role {
    /// Return the role as used in token claims and SQL settings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::CompanyAdmin => "company_admin",
            Self::Employee => "employee",
        }
    }

    /// Interpret the role string of an `admin` row.
    pub fn from_admin_row(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_lowercase().as_str() {
            ADMIN_TABLE_ROLE => Ok(Self::SuperAdmin),
            other => Err(AppError::validation(format!(
                "Unknown admin role '{other}'"
            ))),
        }
    }

    /// Interpret the role string of a `company_user` row.
    pub fn from_company_row(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_lowercase().as_str() {
            COMPANY_ROLE_ADMIN => Ok(Self::CompanyAdmin),
            COMPANY_ROLE_EMPLOYEE => Ok(Self::Employee),
            other => Err(AppError::validation(format!(
                "Unknown company role '{other}'"
            ))),
        }
    }

    /// The string stored in `company_user.role`, or `None` for roles that
    /// do not live in that table.
    pub fn company_row_value(&self) -> Option<&'static str> {
        match self {
            Self::SuperAdmin => None,
            Self::CompanyAdmin => Some(COMPANY_ROLE_ADMIN),
            Self::Employee => Some(COMPANY_ROLE_EMPLOYEE),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "super_admin" => Ok(Self::SuperAdmin),
            "company_admin" => Ok(Self::CompanyAdmin),
            "employee" => Ok(Self::Employee),
            _ => Err(AppError::validation(format!(
                "Invalid role: '{s}'. Expected one of: super_admin, company_admin, employee"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_role_strings() {
        assert_eq!(Role::from_admin_row("superadmin").unwrap(), Role::SuperAdmin);
        assert_eq!(Role::from_admin_row(" SuperAdmin ").unwrap(), Role::SuperAdmin);
        assert!(Role::from_admin_row("admin").is_err());
        assert!(Role::from_admin_row("viewer").is_err());
        assert_eq!(Role::from_company_row(" Admin ").unwrap(), Role::CompanyAdmin);
        assert_eq!(Role::from_company_row("employee").unwrap(), Role::Employee);
        assert!(Role::from_company_row("owner").is_err());
        assert_eq!(Role::CompanyAdmin.company_row_value(), Some("admin"));
        assert_eq!(Role::SuperAdmin.company_row_value(), None);
    }

    #[test]
    fn test_claim_round_trip() {
        for role in [Role::SuperAdmin, Role::CompanyAdmin, Role::Employee] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("viewer".parse::<Role>().is_err());
    }
}
