//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use livehub_core::error::AppError;
use livehub_core::types::id::BookingId;
use livehub_core::types::window::Window;

/// Run `validator` rules, mapping failures to a validation error.
pub fn validate_request<T: Validate>(request: &T) -> Result<(), AppError> {
    request
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))
}

/// Schedule or reschedule a lesson's meeting.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScheduleMeetingRequest {
    /// Meeting title.
    #[validate(length(min = 1, max = 200, message = "Topic must be 1-200 characters"))]
    pub topic: String,
    /// Start time (RFC 3339, UTC).
    pub start_time: DateTime<Utc>,
    /// Length in minutes.
    #[validate(range(min = 1, message = "Duration must be at least one minute"))]
    pub duration_minutes: u32,
}

impl ScheduleMeetingRequest {
    /// The requested window.
    pub fn window(&self) -> Window {
        Window::new(self.start_time, self.duration_minutes)
    }
}

/// `GET /api/meetings` range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMeetingsQuery {
    /// Inclusive lower bound on start time.
    pub from: DateTime<Utc>,
    /// Exclusive upper bound on start time.
    pub to: DateTime<Utc>,
}

/// A window given as query parameters.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WindowQuery {
    /// Start time.
    pub start_time: DateTime<Utc>,
    /// Length in minutes.
    #[validate(range(min = 1, message = "Duration must be at least one minute"))]
    pub duration_minutes: u32,
    /// Booking to ignore (the one being moved).
    pub exclude: Option<BookingId>,
}

impl WindowQuery {
    /// The queried window.
    pub fn window(&self) -> Window {
        Window::new(self.start_time, self.duration_minutes)
    }
}

/// Register a license.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLicenseRequest {
    /// Host account e-mail.
    #[validate(email(message = "A valid e-mail is required"))]
    pub email: String,
    /// Provider-side user id.
    pub host_id: Option<String>,
    /// Participant ceiling.
    #[serde(default = "default_capacity")]
    #[validate(range(min = 1, message = "Capacity must be positive"))]
    pub capacity: i32,
}

fn default_capacity() -> i32 {
    100
}

/// Enable or disable a license.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetLicenseActiveRequest {
    /// New state.
    pub active: bool,
}
