//! Meeting lifecycle events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{BookingId, LessonId, LicenseId};

/// Events related to live-class meetings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MeetingEvent {
    /// A meeting was booked and materialized for the first time.
    Scheduled {
        /// The booking.
        booking_id: BookingId,
        /// Owning lesson.
        lesson_id: LessonId,
        /// License bound to the meeting.
        license_id: LicenseId,
        /// Scheduled start.
        start_time: DateTime<Utc>,
        /// Scheduled length in minutes.
        duration_minutes: u32,
    },
    /// An existing meeting moved to a new window (and possibly license).
    Rescheduled {
        /// The booking.
        booking_id: BookingId,
        /// Owning lesson.
        lesson_id: LessonId,
        /// License bound before the change, if any.
        previous_license_id: Option<LicenseId>,
        /// License bound now.
        license_id: LicenseId,
        /// New start.
        start_time: DateTime<Utc>,
        /// New length in minutes.
        duration_minutes: u32,
    },
    /// A meeting was deleted and its license released.
    Unscheduled {
        /// The booking that was removed.
        booking_id: BookingId,
        /// Owning lesson.
        lesson_id: LessonId,
        /// License that was released, if one was bound.
        license_id: Option<LicenseId>,
    },
    /// Scheduling a lesson failed.
    AllocationFailed {
        /// Lesson that could not be scheduled.
        lesson_id: LessonId,
        /// Why.
        reason: String,
    },
}
