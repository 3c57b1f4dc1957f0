//! # hrdesk-api
//!
//! HTTP API layer for HRDesk built on Axum.
//!
//! Provides the auth and data endpoints, middleware (request logging,
//! sign-in rate limiting, CORS), extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
