//! Task and task comment entities.

pub mod comment;
pub mod model;
pub mod status;

pub use comment::{CreateTaskComment, TaskComment};
pub use model::{CreateTask, Task, TaskFilter, UpdateTask};
pub use status::{TaskPriority, TaskStatus};
