//! Core type definitions used across the HRDesk workspace.

pub mod deep_link;
pub mod pagination;

pub use deep_link::DeepLink;
pub use pagination::{PageRequest, PageResponse};
