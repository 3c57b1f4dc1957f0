//! Convenience result type alias for HRDesk.

use crate::error::AppError;

/// A specialized `Result` type for HRDesk operations.
pub type AppResult<T> = Result<T, AppError>;
