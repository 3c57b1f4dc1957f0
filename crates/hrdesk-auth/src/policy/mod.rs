//! Typed mirror of the database row-level-security policies.
//!
//! Services check the caller against this table before opening a scoped
//! transaction, so a forbidden request fails with a clear authorization
//! error instead of an empty result set.

pub mod enforcer;
pub mod rules;

pub use enforcer::PolicyEnforcer;
pub use rules::{Action, PolicySet, RowScope, Rule, Table};
