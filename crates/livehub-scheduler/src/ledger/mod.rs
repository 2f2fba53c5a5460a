//! Booking ledger trait and backend dispatch.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use livehub_core::config::LedgerBackend;
use livehub_core::error::AppError;
use livehub_core::result::AppResult;
use livehub_core::traits::RemoteMeeting;
use livehub_core::types::id::{BookingId, LessonId, LicenseId};
use livehub_core::types::window::Interval;
use livehub_entity::booking::{Booking, Reservation, Reserved};
use livehub_entity::license::{CreateLicense, License};

pub use memory::MemoryLedger;
pub use postgres::PgLedger;

/// Persistent record of licenses and the bookings holding them.
///
/// [`reserve`](BookingLedger::reserve) is the only write that binds a
/// license, and it must be atomic: the overlap check and the write happen
/// as one step, so two callers can never both bind the same license for
/// overlapping windows. The loser gets
/// [`ErrorKind::AllocationConflict`](livehub_core::error::ErrorKind::AllocationConflict).
///
/// Every reservation bumps the booking's `revision`. The follow-up writes
/// of a scheduling attempt (`materialize`, `release`, rollback removal)
/// name that revision and are no-ops once a newer reservation replaced it.
#[async_trait]
pub trait BookingLedger: Send + Sync + std::fmt::Debug {
    /// Active licenses ordered by ID.
    async fn active_licenses(&self) -> AppResult<Vec<License>>;

    /// All licenses ordered by ID.
    async fn list_licenses(&self) -> AppResult<Vec<License>>;

    /// Register a license.
    async fn create_license(&self, data: &CreateLicense) -> AppResult<License>;

    /// Flip a license's active flag. `None` if it does not exist.
    async fn set_license_active(&self, id: LicenseId, active: bool) -> AppResult<Option<License>>;

    /// Look up a booking.
    async fn find_booking(&self, id: BookingId) -> AppResult<Option<Booking>>;

    /// Look up the booking owned by a lesson.
    async fn find_booking_for_lesson(&self, lesson_id: LessonId) -> AppResult<Option<Booking>>;

    /// License-holding bookings whose window strictly overlaps `interval`.
    async fn bookings_overlapping(&self, interval: &Interval) -> AppResult<Vec<Booking>>;

    /// Bookings starting in `[from, to)`, ordered by start time.
    async fn list_bookings(&self, from: DateTime<Utc>, to: DateTime<Utc>)
    -> AppResult<Vec<Booking>>;

    /// Atomically bind a license to a booking, creating the booking if
    /// needed. Leaves the booking `Assigned` with no meeting details and
    /// reports the meeting it displaced.
    async fn reserve(&self, reservation: &Reservation) -> AppResult<Reserved>;

    /// Store the remote meeting, moving the booking to `Materialized`.
    /// `None` if the booking is gone or no longer at `revision`.
    async fn materialize(
        &self,
        id: BookingId,
        revision: i64,
        meeting: &RemoteMeeting,
    ) -> AppResult<Option<Booking>>;

    /// Unbind the license, leaving the booking `PendingAssignment`.
    /// `None` if the booking is gone or no longer at `revision`.
    async fn release(&self, id: BookingId, revision: i64) -> AppResult<Option<Booking>>;

    /// Delete the booking; with `Some(revision)` only while it is still at
    /// that revision.
    async fn remove(&self, id: BookingId, revision: Option<i64>) -> AppResult<Option<Booking>>;
}

/// Dispatcher for ledger backends.
///
/// Switches between the in-memory and PostgreSQL ledger based on
/// configuration.
#[derive(Debug, Clone)]
pub enum LedgerDispatch {
    /// In-memory ledger (single node).
    Memory(MemoryLedger),
    /// PostgreSQL ledger (multi-node).
    Postgres(PgLedger),
}

impl LedgerDispatch {
    /// Select the backend named by `backend`. The PostgreSQL ledger needs a
    /// connected pool.
    pub fn from_config(backend: LedgerBackend, pool: Option<PgPool>) -> AppResult<Self> {
        match (backend, pool) {
            (LedgerBackend::Memory, _) => Ok(Self::Memory(MemoryLedger::new())),
            (LedgerBackend::Postgres, Some(pool)) => Ok(Self::Postgres(PgLedger::new(pool))),
            (LedgerBackend::Postgres, None) => Err(AppError::configuration(
                "The postgres ledger requires a database connection",
            )),
        }
    }

    /// Backend name for logs.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }
}

#[async_trait]
impl BookingLedger for LedgerDispatch {
    async fn active_licenses(&self) -> AppResult<Vec<License>> {
        match self {
            Self::Memory(inner) => inner.active_licenses().await,
            Self::Postgres(inner) => inner.active_licenses().await,
        }
    }

    async fn list_licenses(&self) -> AppResult<Vec<License>> {
        match self {
            Self::Memory(inner) => inner.list_licenses().await,
            Self::Postgres(inner) => inner.list_licenses().await,
        }
    }

    async fn create_license(&self, data: &CreateLicense) -> AppResult<License> {
        match self {
            Self::Memory(inner) => inner.create_license(data).await,
            Self::Postgres(inner) => inner.create_license(data).await,
        }
    }

    async fn set_license_active(&self, id: LicenseId, active: bool) -> AppResult<Option<License>> {
        match self {
            Self::Memory(inner) => inner.set_license_active(id, active).await,
            Self::Postgres(inner) => inner.set_license_active(id, active).await,
        }
    }

    async fn find_booking(&self, id: BookingId) -> AppResult<Option<Booking>> {
        match self {
            Self::Memory(inner) => inner.find_booking(id).await,
            Self::Postgres(inner) => inner.find_booking(id).await,
        }
    }

    async fn find_booking_for_lesson(&self, lesson_id: LessonId) -> AppResult<Option<Booking>> {
        match self {
            Self::Memory(inner) => inner.find_booking_for_lesson(lesson_id).await,
            Self::Postgres(inner) => inner.find_booking_for_lesson(lesson_id).await,
        }
    }

    async fn bookings_overlapping(&self, interval: &Interval) -> AppResult<Vec<Booking>> {
        match self {
            Self::Memory(inner) => inner.bookings_overlapping(interval).await,
            Self::Postgres(inner) => inner.bookings_overlapping(interval).await,
        }
    }

    async fn list_bookings(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        match self {
            Self::Memory(inner) => inner.list_bookings(from, to).await,
            Self::Postgres(inner) => inner.list_bookings(from, to).await,
        }
    }

    async fn reserve(&self, reservation: &Reservation) -> AppResult<Reserved> {
        match self {
            Self::Memory(inner) => inner.reserve(reservation).await,
            Self::Postgres(inner) => inner.reserve(reservation).await,
        }
    }

    async fn materialize(
        &self,
        id: BookingId,
        revision: i64,
        meeting: &RemoteMeeting,
    ) -> AppResult<Option<Booking>> {
        match self {
            Self::Memory(inner) => inner.materialize(id, revision, meeting).await,
            Self::Postgres(inner) => inner.materialize(id, revision, meeting).await,
        }
    }

    async fn release(&self, id: BookingId, revision: i64) -> AppResult<Option<Booking>> {
        match self {
            Self::Memory(inner) => inner.release(id, revision).await,
            Self::Postgres(inner) => inner.release(id, revision).await,
        }
    }

    async fn remove(&self, id: BookingId, revision: Option<i64>) -> AppResult<Option<Booking>> {
        match self {
            Self::Memory(inner) => inner.remove(id, revision).await,
            Self::Postgres(inner) => inner.remove(id, revision).await,
        }
    }
}
