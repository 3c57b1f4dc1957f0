//! Policy enforcement against a principal.

use uuid::Uuid;

use hrdesk_core::error::AppError;
use hrdesk_entity::Principal;

use super::rules::{Action, PolicySet, RowScope, Table};

/// Checks principals against the [`PolicySet`].
#[derive(Debug, Clone, Default)]
pub struct PolicyEnforcer {
    policies: PolicySet,
}

impl PolicyEnforcer {
    /// Creates an enforcer with the default policy set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an enforcer with custom policies.
    pub fn with_policies(policies: PolicySet) -> Self {
        Self { policies }
    }

    /// Whether `principal` may perform `action` on a row with `scope`.
    pub fn allows(
        &self,
        principal: &Principal,
        table: Table,
        action: Action,
        scope: &RowScope,
    ) -> bool {
        self.policies
            .rule(principal.role, table, action)
            .permits(principal, scope)
    }

    /// Require access to a single row.
    pub fn require(
        &self,
        principal: &Principal,
        table: Table,
        action: Action,
        scope: &RowScope,
    ) -> Result<(), AppError> {
        if self.allows(principal, table, action, scope) {
            Ok(())
        } else {
            Err(denied(principal, table, action))
        }
    }

    /// Require that a listing, optionally narrowed to `company_id`, could
    /// return rows for `principal`.
    pub fn require_listing(
        &self,
        principal: &Principal,
        table: Table,
        company_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        if self
            .policies
            .rule(principal.role, table, Action::Select)
            .permits_listing(principal, company_id)
        {
            Ok(())
        } else {
            Err(denied(principal, table, Action::Select))
        }
    }

    /// Returns a reference to the underlying policies.
    pub fn policies(&self) -> &PolicySet {
        &self.policies
    }
}

fn denied(principal: &Principal, table: Table, action: Action) -> AppError {
    AppError::authorization(format!(
        "Role '{}' may not {action} this {table}",
        principal.role
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrdesk_core::error::ErrorKind;
    use hrdesk_entity::Role;

    fn principal(role: Role, company_id: Option<Uuid>) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            email: "x@acme.no".to_string(),
            role,
            company_id,
            profile_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_super_admin_allowed_everywhere() {
        let e = PolicyEnforcer::new();
        let p = principal(Role::SuperAdmin, None);
        for table in Table::ALL {
            for action in Action::ALL {
                assert!(e.allows(&p, table, action, &RowScope::default()));
            }
        }
    }

    #[test]
    fn test_company_admin_limited_to_own_company() {
        let e = PolicyEnforcer::new();
        let company = Uuid::new_v4();
        let p = principal(Role::CompanyAdmin, Some(company));

        assert!(e.allows(&p, Table::Task, Action::Delete, &RowScope::company(company)));
        assert!(e.allows(&p, Table::Company, Action::Update, &RowScope::company(company)));
        assert!(!e.allows(&p, Table::Company, Action::Delete, &RowScope::company(company)));
        assert!(!e.allows(&p, Table::Task, Action::Select, &RowScope::company(Uuid::new_v4())));
        assert!(!e.allows(&p, Table::Admin, Action::Select, &RowScope::default()));
        assert!(!e.allows(&p, Table::ActivityArchive, Action::Select, &RowScope::default()));
    }

    #[test]
    fn test_employee_sees_only_assigned_tasks() {
        let e = PolicyEnforcer::new();
        let company = Uuid::new_v4();
        let p = principal(Role::Employee, Some(company));

        let mine = RowScope::company(company).assigned_to(Some(p.user_id));
        let theirs = RowScope::company(company).assigned_to(Some(Uuid::new_v4()));
        let foreign = RowScope::company(Uuid::new_v4()).assigned_to(Some(p.user_id));

        assert!(e.allows(&p, Table::Task, Action::Select, &mine));
        assert!(e.allows(&p, Table::Task, Action::Update, &mine));
        assert!(!e.allows(&p, Table::Task, Action::Delete, &mine));
        assert!(!e.allows(&p, Table::Task, Action::Select, &theirs));
        assert!(!e.allows(&p, Table::Task, Action::Select, &foreign));
    }

    #[test]
    fn test_employee_reports_and_profile() {
        let e = PolicyEnforcer::new();
        let company = Uuid::new_v4();
        let p = principal(Role::Employee, Some(company));

        let concerning_me = RowScope::company(company)
            .owned_by(Uuid::new_v4())
            .assigned_to(Some(p.user_id));
        assert!(e.allows(&p, Table::Report, Action::Select, &concerning_me));
        assert!(!e.allows(&p, Table::Report, Action::Update, &concerning_me));

        let filed_by_me = RowScope::company(company).owned_by(p.user_id);
        assert!(e.allows(&p, Table::Report, Action::Insert, &filed_by_me));

        let other_profile = RowScope::company(company).owned_by(Uuid::new_v4());
        assert!(!e.allows(&p, Table::CompanyUser, Action::Select, &other_profile));
        let own_profile = RowScope::company(company).owned_by(p.user_id);
        assert!(e.allows(&p, Table::CompanyUser, Action::Update, &own_profile));
    }

    #[test]
    fn test_listing_checks() {
        let e = PolicyEnforcer::new();
        let company = Uuid::new_v4();
        let p = principal(Role::Employee, Some(company));

        assert!(e.require_listing(&p, Table::Task, Some(company)).is_ok());
        assert!(e.require_listing(&p, Table::Task, None).is_ok());
        let err = e
            .require_listing(&p, Table::Task, Some(Uuid::new_v4()))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert!(e.require_listing(&p, Table::ActivityArchive, None).is_err());
        assert!(e.require_listing(&p, Table::CompanyUser, Some(company)).is_ok());
    }
}
