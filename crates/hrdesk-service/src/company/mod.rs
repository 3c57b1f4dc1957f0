//! Company (tenant) management.

pub mod service;

pub use service::CompanyService;
