//! Repository implementations for all LiveHub entities.

pub mod booking;
pub mod license;

pub use booking::BookingRepository;
pub use license::LicenseRepository;

use livehub_core::error::{AppError, ErrorKind};

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for `exclusion_violation`.
const EXCLUSION_VIOLATION: &str = "23P01";

/// Map a sqlx error to an [`AppError`], recognising constraint violations.
pub(crate) fn map_db_error(context: &str, err: sqlx::Error) -> AppError {
    let code = err
        .as_database_error()
        .and_then(|db| db.code())
        .map(|c| c.into_owned());

    match code.as_deref() {
        Some(EXCLUSION_VIOLATION) => AppError::with_source(
            ErrorKind::AllocationConflict,
            format!("{context}: license already booked for an overlapping window"),
            err,
        ),
        Some(UNIQUE_VIOLATION) => AppError::with_source(
            ErrorKind::Conflict,
            format!("{context}: duplicate entry"),
            err,
        ),
        _ => AppError::with_source(ErrorKind::Database, context.to_string(), err),
    }
}
