//! Request handlers, one module per resource.

pub mod activity;
pub mod auth;
pub mod company;
pub mod employee;
pub mod health;
pub mod profile;
pub mod report;
pub mod task;
