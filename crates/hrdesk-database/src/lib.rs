//! # hrdesk-database
//!
//! PostgreSQL connection management, migrations, row-level-security scoped
//! transactions and repository implementations for HRDesk.
//!
//! Credential repositories ([`UserRepository`], [`AdminRepository`]) hold
//! the pool and run as the table owner. Tenant repositories are stateless
//! and take an executor, normally a transaction opened with
//! [`scope::begin_scoped`] so that the database policies apply.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod scope;

pub use connection::DatabasePool;
pub use repositories::{AdminRepository, UserRepository};
pub use scope::{ScopedTransaction, begin_scoped, commit};

use hrdesk_core::error::{AppError, ErrorKind};

/// Map a sqlx error to a database [`AppError`] with the given context.
pub(crate) fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

/// Whether `err` is a violation of the named unique constraint.
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.constraint() == Some(constraint))
}
