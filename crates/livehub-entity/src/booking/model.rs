//! Booking entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use livehub_core::types::id::{BookingId, LessonId, LicenseId};
use livehub_core::types::window::{Interval, Window};

use super::status::BookingStatus;

/// A scheduled live-class meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Booking {
    /// Unique booking identifier.
    pub id: BookingId,
    /// Lesson that owns the meeting (one booking per lesson).
    pub lesson_id: LessonId,
    /// Meeting title.
    pub topic: String,
    /// Bound license; `None` until assigned or after a release.
    pub license_id: Option<LicenseId>,
    /// Scheduled start (UTC).
    pub start_time: DateTime<Utc>,
    /// Scheduled length in seconds.
    pub duration_seconds: i32,
    /// `start_time + duration_seconds`, stored so the ledger can index it.
    pub end_time: DateTime<Utc>,
    /// Provider meeting number, once materialized.
    pub meeting_number: Option<i64>,
    /// Provider join passcode, once materialized.
    pub passcode: Option<String>,
    /// Lifecycle state.
    pub status: BookingStatus,
    /// Bumped by every reservation; later writes for a reservation only
    /// apply while the booking still carries its revision.
    pub revision: i64,
    /// When the booking was created.
    pub created_at: DateTime<Utc>,
    /// Last modification.
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// The window this booking occupies.
    pub fn window(&self) -> Window {
        Window::new(self.start_time, (self.duration_seconds / 60).max(0) as u32)
    }

    /// The half-open interval `[start_time, end_time)`.
    pub fn interval(&self) -> Interval {
        Interval::new(self.start_time, self.end_time)
    }

    /// Whether a remote meeting exists for this booking.
    pub fn is_materialized(&self) -> bool {
        self.status == BookingStatus::Materialized && self.meeting_number.is_some()
    }

    /// Whether this booking blocks `license` during `interval`.
    pub fn blocks(&self, license: LicenseId, interval: &Interval) -> bool {
        self.license_id == Some(license) && self.interval().overlaps(interval)
    }
}
