//! # hrdesk-service
//!
//! Business logic for HRDesk. Every tenant operation first checks the typed
//! policy table, then runs inside a transaction scoped to the caller so the
//! database policies apply as well.
//!
//! Services follow constructor injection: dependencies are handed over at
//! construction time as `Arc`s or cheaply clonable handles.

pub mod activity;
pub mod company;
pub mod context;
pub mod employee;
pub mod mail;
pub mod profile;
pub mod report;
pub mod task;

pub use activity::ActivityService;
pub use company::CompanyService;
pub use context::RequestContext;
pub use employee::EmployeeService;
pub use mail::HttpMailer;
pub use profile::ProfileService;
pub use report::ReportService;
pub use task::TaskService;
