//! Employee (company user) management.

pub mod service;

pub use service::{CreateEmployeeRequest, CreatedEmployee, EmployeeService};
