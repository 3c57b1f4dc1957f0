//! Role resolution from the `admin` and `company_user` tables.

pub mod resolver;

pub use resolver::RoleResolver;
