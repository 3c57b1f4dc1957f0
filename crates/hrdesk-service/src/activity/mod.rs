//! Activity log recording, listing and archiving.

pub mod service;

pub use service::ActivityService;
pub(crate) use service::log_activity;
