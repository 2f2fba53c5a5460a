//! Atomic bind request for the booking ledger.

use serde::{Deserialize, Serialize};

use livehub_core::types::id::{BookingId, LessonId, LicenseId};
use livehub_core::types::window::Window;

use super::model::Booking;

/// "Bind `license_id` to booking `booking_id` for `window`", applied by the
/// ledger only if no other booking holds that license for an overlapping
/// window. Creates the booking when `booking_id` does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Booking to create or update.
    pub booking_id: BookingId,
    /// Owning lesson.
    pub lesson_id: LessonId,
    /// Meeting title.
    pub topic: String,
    /// License to bind.
    pub license_id: LicenseId,
    /// Window to occupy.
    pub window: Window,
}

/// Outcome of an applied [`Reservation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserved {
    /// The booking as written, carrying its new revision.
    pub booking: Booking,
    /// Remote meeting the booking held before this reservation cleared it.
    pub displaced_meeting: Option<i64>,
}
