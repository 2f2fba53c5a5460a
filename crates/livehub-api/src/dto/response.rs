//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use livehub_core::types::id::{BookingId, LessonId, LicenseId};
use livehub_core::types::window::Window;
use livehub_entity::booking::{Booking, BookingStatus};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Wrap a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since start.
    pub uptime_seconds: u64,
    /// Ledger backend in use.
    pub ledger: String,
    /// Database status, when a database is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

/// A booking as shown to API clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingResponse {
    /// Booking ID.
    pub id: BookingId,
    /// Owning lesson.
    pub lesson_id: LessonId,
    /// Meeting title.
    pub topic: String,
    /// Bound license, if any.
    pub license_id: Option<LicenseId>,
    /// Start time.
    pub start_time: DateTime<Utc>,
    /// End time.
    pub end_time: DateTime<Utc>,
    /// Length in minutes.
    pub duration_minutes: u32,
    /// Provider meeting number.
    pub meeting_number: Option<i64>,
    /// Join passcode.
    pub passcode: Option<String>,
    /// Lifecycle state.
    pub status: BookingStatus,
}

impl From<Booking> for MeetingResponse {
    fn from(booking: Booking) -> Self {
        let duration_minutes = booking.window().duration_minutes;
        Self {
            id: booking.id,
            lesson_id: booking.lesson_id,
            topic: booking.topic,
            license_id: booking.license_id,
            start_time: booking.start_time,
            end_time: booking.end_time,
            duration_minutes,
            meeting_number: booking.meeting_number,
            passcode: booking.passcode,
            status: booking.status,
        }
    }
}

/// Licenses free for a window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    /// The queried window.
    pub window: Window,
    /// Free license IDs, lowest first.
    pub license_ids: Vec<LicenseId>,
}
