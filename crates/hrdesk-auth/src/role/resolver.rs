//! Resolves the permission tier of a user.

use std::sync::Arc;

use tracing::debug;

use hrdesk_core::error::AppError;
use hrdesk_entity::user::User;
use hrdesk_entity::{Principal, Role};

use crate::store::RoleStore;

/// Looks a user up in `admin`, then in `company_user`.
#[derive(Clone)]
pub struct RoleResolver {
    store: Arc<dyn RoleStore>,
}

impl std::fmt::Debug for RoleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleResolver").finish_non_exhaustive()
    }
}

impl RoleResolver {
    /// Creates a resolver over a role store.
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }

    /// Resolve the principal for `user`.
    ///
    /// An `admin` row wins over a `company_user` row. A user with neither
    /// has no role and is refused.
    pub async fn resolve(&self, user: &User) -> Result<Principal, AppError> {
        if let Some(admin) = self.store.find_admin(user.id).await? {
            let role = Role::from_admin_row(&admin.role)
                .map_err(|e| AppError::authorization(e.message))?;
            debug!(user_id = %user.id, role = %role, "Resolved role from admin table");
            return Ok(Principal {
                user_id: user.id,
                email: user.email.clone(),
                role,
                company_id: None,
                profile_id: admin.id,
            });
        }

        if let Some(member) = self.store.find_company_user(user.id).await? {
            let role = member
                .app_role()
                .map_err(|e| AppError::authorization(e.message))?;
            debug!(
                user_id = %user.id,
                company_id = %member.company_id,
                role = %role,
                "Resolved role from company_user table"
            );
            return Ok(Principal {
                user_id: user.id,
                email: user.email.clone(),
                role,
                company_id: Some(member.company_id),
                profile_id: member.id,
            });
        }

        Err(AppError::authorization("No role assigned to this account"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRoleStore;
    use chrono::Utc;
    use hrdesk_core::error::ErrorKind;
    use hrdesk_entity::user::UserStatus;
    use uuid::Uuid;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "ola@acme.no".to_string(),
            password_hash: String::new(),
            full_name: None,
            status: UserStatus::Active,
            failed_login_attempts: 0,
            locked_until: None,
            reset_token: None,
            reset_token_expires_at: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_admin_table_wins() {
        let store = MemoryRoleStore::new();
        let u = user();
        store.insert_member(u.id, Uuid::new_v4(), "employee").await;
        let admin = store.make_super_admin(u.id).await;

        let p = RoleResolver::new(Arc::new(store)).resolve(&u).await.unwrap();
        assert_eq!(p.role, Role::SuperAdmin);
        assert_eq!(p.company_id, None);
        assert_eq!(p.profile_id, admin.id);
    }

    #[tokio::test]
    async fn test_company_roles() {
        let store = MemoryRoleStore::new();
        let company = Uuid::new_v4();
        let (a, e) = (user(), user());
        store.insert_member(a.id, company, "admin").await;
        store.insert_member(e.id, company, "employee").await;
        let resolver = RoleResolver::new(Arc::new(store));

        let pa = resolver.resolve(&a).await.unwrap();
        assert_eq!(pa.role, Role::CompanyAdmin);
        assert_eq!(pa.company_id, Some(company));
        assert_eq!(resolver.resolve(&e).await.unwrap().role, Role::Employee);
    }

    #[tokio::test]
    async fn test_no_role_and_unknown_role() {
        let store = MemoryRoleStore::new();
        let (none, odd) = (user(), user());
        store.insert_member(odd.id, Uuid::new_v4(), "owner").await;
        let resolver = RoleResolver::new(Arc::new(store));

        let err = resolver.resolve(&none).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert_eq!(err.message, "No role assigned to this account");
        assert_eq!(
            resolver.resolve(&odd).await.unwrap_err().kind,
            ErrorKind::Authorization
        );
    }
}
