//! Tasks and task comments.

pub mod service;

pub use service::{CreateTaskRequest, TaskService};
