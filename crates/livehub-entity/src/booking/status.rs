//! Booking lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a booking is in its lifecycle.
///
/// "Unscheduled" (no row yet) and "retired" (row deleted) are not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Window validated but no license bound (a failed materialization
    /// leaves the booking here).
    PendingAssignment,
    /// License bound locally, remote meeting not created yet.
    Assigned,
    /// Remote meeting exists; meeting number and passcode are set.
    Materialized,
}

impl BookingStatus {
    /// Whether the booking currently holds a license.
    pub fn holds_license(&self) -> bool {
        matches!(self, Self::Assigned | Self::Materialized)
    }

    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingAssignment => "pending_assignment",
            Self::Assigned => "assigned",
            Self::Materialized => "materialized",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
