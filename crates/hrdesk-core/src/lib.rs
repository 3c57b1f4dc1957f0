//! # hrdesk-core
//!
//! Core crate for HRDesk. Contains configuration schemas, the unified
//! error system, pagination and deep-link types, and the traits other
//! crates implement (such as the outbound [`traits::Mailer`]).
//!
//! This crate has **no** internal dependencies on other HRDesk crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
