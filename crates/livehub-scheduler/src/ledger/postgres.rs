//! PostgreSQL-backed booking ledger for multi-node deployments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use livehub_core::result::AppResult;
use livehub_core::traits::RemoteMeeting;
use livehub_core::types::id::{BookingId, LessonId, LicenseId};
use livehub_core::types::window::Interval;
use livehub_database::repositories::{BookingRepository, LicenseRepository};
use livehub_entity::booking::{Booking, Reservation, Reserved};
use livehub_entity::license::{CreateLicense, License};

use super::BookingLedger;

/// Ledger on top of the `licenses` and `bookings` tables.
///
/// Atomicity of [`reserve`](BookingLedger::reserve) comes from the
/// repository transaction and the `bookings_license_no_overlap` exclusion
/// constraint.
#[derive(Debug, Clone)]
pub struct PgLedger {
    licenses: LicenseRepository,
    bookings: BookingRepository,
}

impl PgLedger {
    /// Create a ledger over a connected pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            licenses: LicenseRepository::new(pool.clone()),
            bookings: BookingRepository::new(pool),
        }
    }
}

#[async_trait]
impl BookingLedger for PgLedger {
    async fn active_licenses(&self) -> AppResult<Vec<License>> {
        self.licenses.find_active().await
    }

    async fn list_licenses(&self) -> AppResult<Vec<License>> {
        self.licenses.list_all().await
    }

    async fn create_license(&self, data: &CreateLicense) -> AppResult<License> {
        self.licenses.create(data).await
    }

    async fn set_license_active(&self, id: LicenseId, active: bool) -> AppResult<Option<License>> {
        self.licenses.set_active(id, active).await
    }

    async fn find_booking(&self, id: BookingId) -> AppResult<Option<Booking>> {
        self.bookings.find_by_id(id).await
    }

    async fn find_booking_for_lesson(&self, lesson_id: LessonId) -> AppResult<Option<Booking>> {
        self.bookings.find_by_lesson(lesson_id).await
    }

    async fn bookings_overlapping(&self, interval: &Interval) -> AppResult<Vec<Booking>> {
        self.bookings.find_overlapping(interval).await
    }

    async fn list_bookings(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        self.bookings.list_in_range(from, to).await
    }

    async fn reserve(&self, reservation: &Reservation) -> AppResult<Reserved> {
        self.bookings.reserve(reservation).await
    }

    async fn materialize(
        &self,
        id: BookingId,
        revision: i64,
        meeting: &RemoteMeeting,
    ) -> AppResult<Option<Booking>> {
        self.bookings
            .materialize(id, revision, meeting.meeting_number, &meeting.passcode)
            .await
    }

    async fn release(&self, id: BookingId, revision: i64) -> AppResult<Option<Booking>> {
        self.bookings.release(id, revision).await
    }

    async fn remove(&self, id: BookingId, revision: Option<i64>) -> AppResult<Option<Booking>> {
        self.bookings.delete(id, revision).await
    }
}
