//! # hrdesk-entity
//!
//! Domain entity models for HRDesk. Every struct in this crate represents a
//! database table row or a domain value object. Database rows additionally
//! derive `sqlx::FromRow`.

pub mod activity;
pub mod company;
pub mod principal;
pub mod report;
pub mod role;
pub mod task;
pub mod user;

pub use principal::Principal;
pub use role::Role;
