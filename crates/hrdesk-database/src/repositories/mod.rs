//! Repository implementations for all HRDesk tables.

pub mod activity;
pub mod admin;
pub mod company;
pub mod company_user;
pub mod report;
pub mod task;
pub mod task_comment;
pub mod user;

pub use activity::ActivityRepository;
pub use admin::AdminRepository;
pub use company::CompanyRepository;
pub use company_user::CompanyUserRepository;
pub use report::ReportRepository;
pub use task::TaskRepository;
pub use task_comment::TaskCommentRepository;
pub use user::UserRepository;
