//! Request context carrying the resolved caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

use hrdesk_core::error::AppError;
use hrdesk_core::result::AppResult;
use hrdesk_database::repositories::CompanyUserRepository;
use hrdesk_entity::{Principal, Role};

/// Context for the current authenticated request.
///
/// Built by the API extractor after the token has been verified and the
/// role re-resolved, then passed into every service method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The caller as resolved from the role tables.
    pub principal: Principal,
    /// IP address of the request origin.
    pub ip_address: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(principal: Principal, ip_address: Option<String>) -> Self {
        Self {
            principal,
            ip_address,
            request_time: Utc::now(),
        }
    }

    /// The caller's user ID.
    pub fn user_id(&self) -> Uuid {
        self.principal.user_id
    }

    /// The caller's role.
    pub fn role(&self) -> Role {
        self.principal.role
    }

    /// Returns whether the caller is a super admin.
    pub fn is_super_admin(&self) -> bool {
        self.principal.is_super_admin()
    }

    /// The company an operation targets: the requested one, or the
    /// caller's own when none is given. Whether the caller may touch it is
    /// left to the policy check.
    pub fn target_company(&self, requested: Option<Uuid>) -> AppResult<Uuid> {
        match requested {
            Some(id) => Ok(id),
            None if self.is_super_admin() => Err(AppError::validation(
                "company_id is required for super admins",
            )),
            None => self.principal.require_company(),
        }
    }
}

/// Require `user_id` to hold a `company_user` row in `company_id`.
pub(crate) async fn ensure_member(
    conn: &mut PgConnection,
    user_id: Uuid,
    company_id: Uuid,
) -> AppResult<()> {
    match CompanyUserRepository::find_by_user_id(conn, user_id).await? {
        Some(member) if member.company_id == company_id => Ok(()),
        _ => Err(AppError::validation(format!(
            "User {user_id} is not an employee of company {company_id}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: Role, company_id: Option<Uuid>) -> RequestContext {
        RequestContext::new(
            Principal {
                user_id: Uuid::new_v4(),
                email: "ola@firma.no".to_string(),
                role,
                company_id,
                profile_id: Uuid::new_v4(),
            },
            None,
        )
    }

    #[test]
    fn test_target_company() {
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();

        let admin = ctx(Role::CompanyAdmin, Some(own));
        assert_eq!(admin.target_company(Some(other)).unwrap(), other);
        assert_eq!(admin.target_company(None).unwrap(), own);

        let root = ctx(Role::SuperAdmin, None);
        assert_eq!(root.target_company(Some(other)).unwrap(), other);
        assert!(root.target_company(None).is_err());
    }
}
