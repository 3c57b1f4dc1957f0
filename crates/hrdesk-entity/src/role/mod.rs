//! Application roles and the two role-bearing profile tables.

pub mod admin;
pub mod company_user;
pub mod role;

pub use admin::AdminProfile;
pub use company_user::{CompanyUser, CreateCompanyUser, EmployeeView, UpdateCompanyUser};
pub use role::Role;
