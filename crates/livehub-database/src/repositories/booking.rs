//! Booking ledger repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use livehub_core::error::{AppError, ErrorKind};
use livehub_core::result::AppResult;
use livehub_core::types::id::{BookingId, LessonId};
use livehub_core::types::window::Interval;
use livehub_entity::booking::{Booking, BookingStatus, Reservation, Reserved};

use super::map_db_error;

/// Repository for scheduled meetings.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    /// Create a new booking repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a booking by ID.
    pub async fn find_by_id(&self, id: BookingId) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find booking", e))
    }

    /// Find the booking owned by a lesson.
    pub async fn find_by_lesson(&self, lesson_id: LessonId) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE lesson_id = $1")
            .bind(lesson_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find lesson booking", e)
            })
    }

    /// License-holding bookings whose window strictly overlaps `interval`.
    pub async fn find_overlapping(&self, interval: &Interval) -> AppResult<Vec<Booking>> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings \
             WHERE license_id IS NOT NULL AND start_time < $2 AND end_time > $1 \
             ORDER BY start_time",
        )
        .bind(interval.start)
        .bind(interval.end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find overlapping bookings", e)
        })
    }

    /// All bookings starting in `[from, to)`, ordered by start time.
    pub async fn list_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE start_time >= $1 AND start_time < $2 \
             ORDER BY start_time, id",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list bookings", e))
    }

    /// Atomically bind a license to a booking for a window.
    ///
    /// Runs in one transaction: the license row is share-locked so it cannot
    /// be deactivated underneath us, an existing booking row is locked to
    /// read the meeting it is about to lose, overlapping holders are
    /// checked, and the booking is upserted in `assigned` state with its
    /// revision bumped and previous meeting details cleared. A concurrent
    /// writer that slips past the check is rejected by the
    /// `bookings_license_no_overlap` exclusion constraint; both paths
    /// surface as [`ErrorKind::AllocationConflict`].
    pub async fn reserve(&self, reservation: &Reservation) -> AppResult<Reserved> {
        let interval = reservation.window.interval();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin reservation", e))?;

        let active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM licenses WHERE id = $1 FOR SHARE")
                .bind(reservation.license_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_db_error("Failed to lock license", e))?;

        match active {
            None => {
                return Err(AppError::not_found(format!(
                    "License {} not found",
                    reservation.license_id
                )));
            }
            Some(false) => {
                return Err(AppError::allocation_conflict(format!(
                    "License {} was deactivated",
                    reservation.license_id
                )));
            }
            Some(true) => {}
        }

        let displaced_meeting = sqlx::query_scalar::<_, Option<i64>>(
            "SELECT meeting_number FROM bookings WHERE id = $1 FOR UPDATE",
        )
        .bind(reservation.booking_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_db_error("Failed to lock booking", e))?
        .flatten();

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM bookings \
             WHERE license_id = $1 AND id <> $2 AND start_time < $4 AND end_time > $3)",
        )
        .bind(reservation.license_id)
        .bind(reservation.booking_id)
        .bind(interval.start)
        .bind(interval.end)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error("Failed to check license overlap", e))?;

        if taken {
            debug!(license_id = %reservation.license_id, "License taken between resolve and reserve");
            return Err(AppError::allocation_conflict(format!(
                "License {} already booked for an overlapping window",
                reservation.license_id
            )));
        }

        let booking = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings \
                (id, lesson_id, topic, license_id, start_time, duration_seconds, end_time, status, \
                 revision) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 1) \
             ON CONFLICT (id) DO UPDATE SET \
                topic = EXCLUDED.topic, \
                license_id = EXCLUDED.license_id, \
                start_time = EXCLUDED.start_time, \
                duration_seconds = EXCLUDED.duration_seconds, \
                end_time = EXCLUDED.end_time, \
                status = EXCLUDED.status, \
                meeting_number = NULL, \
                passcode = NULL, \
                revision = bookings.revision + 1, \
                updated_at = NOW() \
             RETURNING *",
        )
        .bind(reservation.booking_id)
        .bind(reservation.lesson_id)
        .bind(&reservation.topic)
        .bind(reservation.license_id)
        .bind(interval.start)
        .bind(reservation.window.duration_seconds() as i32)
        .bind(interval.end)
        .bind(BookingStatus::Assigned)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error("Failed to reserve license", e))?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("Failed to commit reservation", e))?;

        Ok(Reserved {
            booking,
            displaced_meeting,
        })
    }

    /// Record the remote meeting for a booking still at `revision`.
    pub async fn materialize(
        &self,
        id: BookingId,
        revision: i64,
        meeting_number: i64,
        passcode: &str,
    ) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET meeting_number = $3, passcode = $4, status = $5, \
             updated_at = NOW() WHERE id = $1 AND revision = $2 RETURNING *",
        )
        .bind(id)
        .bind(revision)
        .bind(meeting_number)
        .bind(passcode)
        .bind(BookingStatus::Materialized)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to materialize booking", e))
    }

    /// Drop the license binding and meeting details, keeping the row as
    /// `pending_assignment`. Only applies while the booking is at `revision`.
    pub async fn release(&self, id: BookingId, revision: i64) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET license_id = NULL, meeting_number = NULL, passcode = NULL, \
             status = $3, updated_at = NOW() WHERE id = $1 AND revision = $2 RETURNING *",
        )
        .bind(id)
        .bind(revision)
        .bind(BookingStatus::PendingAssignment)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to release booking", e))
    }

    /// Delete a booking, returning the removed row. With a revision, only
    /// a booking still at that revision is deleted.
    pub async fn delete(&self, id: BookingId, revision: Option<i64>) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>(
            "DELETE FROM bookings WHERE id = $1 AND ($2::BIGINT IS NULL OR revision = $2) \
             RETURNING *",
        )
        .bind(id)
        .bind(revision)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete booking", e))
    }
}
