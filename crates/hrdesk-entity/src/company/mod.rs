//! Company (tenant) entity.

pub mod model;

pub use model::{Company, CreateCompany, UpdateCompany};
