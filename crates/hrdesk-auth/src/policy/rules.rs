//! Table × action → rule mapping per role.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hrdesk_entity::{Principal, Role};

/// Tables covered by row-level security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// `company`
    Company,
    /// `company_user`
    CompanyUser,
    /// `admin`
    Admin,
    /// `tasks`
    Task,
    /// `task_comments`
    TaskComment,
    /// `accident_reports`, `illness_reports`, `departure_reports`
    Report,
    /// `activity_logs`
    ActivityLog,
    /// `activity_logs_archive`
    ActivityArchive,
}

impl Table {
    /// Every covered table.
    pub const ALL: [Table; 8] = [
        Self::Company,
        Self::CompanyUser,
        Self::Admin,
        Self::Task,
        Self::TaskComment,
        Self::Report,
        Self::ActivityLog,
        Self::ActivityArchive,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::CompanyUser => "employee",
            Self::Admin => "admin",
            Self::Task => "task",
            Self::TaskComment => "comment",
            Self::Report => "report",
            Self::ActivityLog => "activity",
            Self::ActivityArchive => "archived activity",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// SQL command a policy applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// `SELECT`
    Select,
    /// `INSERT`
    Insert,
    /// `UPDATE`
    Update,
    /// `DELETE`
    Delete,
}

impl Action {
    /// Every action.
    pub const ALL: [Action; 4] = [Self::Select, Self::Insert, Self::Update, Self::Delete];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Select => "read",
            Self::Insert => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// The ownership columns of the row being accessed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowScope {
    /// Company the row belongs to (for `company`, its own ID).
    pub company_id: Option<Uuid>,
    /// User who owns the row (`user_id`, `submitted_by`, `author_id`).
    pub owner_id: Option<Uuid>,
    /// User the row is assigned to or concerns (`assigned_to`, `employee_id`).
    pub assignee_id: Option<Uuid>,
}

impl RowScope {
    /// Scope with only a company.
    pub fn company(company_id: Uuid) -> Self {
        Self {
            company_id: Some(company_id),
            ..Self::default()
        }
    }

    /// Set the owner.
    pub fn owned_by(mut self, owner_id: Uuid) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Set the assignee.
    pub fn assigned_to(mut self, assignee_id: Option<Uuid>) -> Self {
        self.assignee_id = assignee_id;
        self
    }
}

/// Condition a row must meet for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Always allowed.
    Allow,
    /// Never allowed.
    Deny,
    /// Row belongs to the caller's company.
    SameCompany,
    /// Caller owns the row.
    Own,
    /// Caller owns the row and it belongs to the caller's company.
    OwnInCompany,
    /// Row is assigned to the caller within the caller's company.
    AssignedInCompany,
    /// Caller owns the row or it concerns them, within their company.
    InvolvedInCompany,
}

impl Rule {
    /// Evaluate the rule for one row.
    pub fn permits(&self, principal: &Principal, scope: &RowScope) -> bool {
        let same_company =
            || principal.company_id.is_some() && scope.company_id == principal.company_id;
        let own = || scope.owner_id == Some(principal.user_id);
        let assigned = || scope.assignee_id == Some(principal.user_id);

        match self {
            Self::Allow => true,
            Self::Deny => false,
            Self::SameCompany => same_company(),
            Self::Own => own(),
            Self::OwnInCompany => same_company() && own(),
            Self::AssignedInCompany => same_company() && assigned(),
            Self::InvolvedInCompany => same_company() && (own() || assigned()),
        }
    }

    /// Whether a listing could return any row at all. When the listing is
    /// narrowed to a company, company-bound rules require membership.
    pub fn permits_listing(&self, principal: &Principal, company_id: Option<Uuid>) -> bool {
        match self {
            Self::Allow => true,
            Self::Deny => false,
            Self::Own => true,
            Self::SameCompany
            | Self::OwnInCompany
            | Self::AssignedInCompany
            | Self::InvolvedInCompany => match company_id {
                Some(id) => principal.belongs_to(id),
                None => principal.company_id.is_some(),
            },
        }
    }
}

/// The complete policy table.
#[derive(Debug, Clone)]
pub struct PolicySet {
    rules: HashMap<(Role, Table, Action), Rule>,
}

impl PolicySet {
    /// The policies declared in `0002_row_level_security.sql`.
    pub fn new() -> Self {
        use Action::*;
        use Rule::*;
        use Table::*;

        let mut rules = HashMap::new();

        // Super admin: everything.
        for table in Table::ALL {
            for action in Action::ALL {
                rules.insert((Role::SuperAdmin, table, action), Allow);
            }
        }

        // Company admin: own company. Company row read/update only, no
        // access to the admin table or the archive.
        let ca = Role::CompanyAdmin;
        rules.insert((ca, Company, Select), SameCompany);
        rules.insert((ca, Company, Update), SameCompany);
        for action in Action::ALL {
            rules.insert((ca, CompanyUser, action), SameCompany);
            rules.insert((ca, Task, action), SameCompany);
            rules.insert((ca, Report, action), SameCompany);
        }
        rules.insert((ca, TaskComment, Select), SameCompany);
        rules.insert((ca, TaskComment, Insert), OwnInCompany);
        rules.insert((ca, TaskComment, Delete), SameCompany);
        rules.insert((ca, ActivityLog, Select), SameCompany);
        rules.insert((ca, ActivityLog, Insert), Own);

        // Employee: own company row, own profile, assigned tasks, comments
        // on those tasks, reports they filed or that concern them, own
        // activity.
        let em = Role::Employee;
        rules.insert((em, Company, Select), SameCompany);
        rules.insert((em, CompanyUser, Select), Own);
        rules.insert((em, CompanyUser, Update), Own);
        rules.insert((em, Task, Select), AssignedInCompany);
        rules.insert((em, Task, Update), AssignedInCompany);
        rules.insert((em, TaskComment, Select), AssignedInCompany);
        rules.insert((em, TaskComment, Insert), AssignedInCompany);
        rules.insert((em, Report, Select), InvolvedInCompany);
        rules.insert((em, Report, Insert), OwnInCompany);
        rules.insert((em, ActivityLog, Select), Own);
        rules.insert((em, ActivityLog, Insert), Own);

        Self { rules }
    }

    /// The rule for a role, table and action. Missing entries deny.
    pub fn rule(&self, role: Role, table: Table, action: Action) -> Rule {
        self.rules
            .get(&(role, table, action))
            .copied()
            .unwrap_or(Rule::Deny)
    }
}

impl Default for PolicySet {
    fn default() -> Self {
        Self::new()
    }
}
