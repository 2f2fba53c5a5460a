//! Convenience result type alias for LiveHub.

use crate::error::AppError;

/// A specialized `Result` type for LiveHub operations.
pub type AppResult<T> = Result<T, AppError>;
