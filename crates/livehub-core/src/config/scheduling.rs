//! License allocation and scheduling configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Upper bound for `past_tolerance_seconds` (one day).
const MAX_PAST_TOLERANCE_SECONDS: u64 = 86_400;

/// Upper bound for `max_horizon_days` (ten years).
const MAX_HORIZON_DAYS: u32 = 3_650;

/// Which booking ledger backs the allocator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    /// PostgreSQL ledger (multi-node safe).
    #[default]
    Postgres,
    /// In-memory ledger (single node, development and tests).
    Memory,
}

/// Scheduling core configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// How far in the past (seconds) a requested start time may lie and
    /// still be accepted, to absorb client clock skew.
    #[serde(default = "default_past_tolerance")]
    pub past_tolerance_seconds: u64,
    /// Longest meeting that can be booked, in minutes.
    #[serde(default = "default_max_duration")]
    pub max_duration_minutes: u32,
    /// How far ahead (days) a meeting may be scheduled.
    #[serde(default = "default_max_horizon")]
    pub max_horizon_days: u32,
    /// How many times the allocator re-resolves availability after losing
    /// a race for a license before reporting exhaustion.
    #[serde(default = "default_allocation_attempts")]
    pub allocation_attempts: u32,
    /// Booking ledger backend.
    #[serde(default)]
    pub ledger: LedgerBackend,
    /// Capacity of the meeting lifecycle event channel.
    #[serde(default = "default_event_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            past_tolerance_seconds: default_past_tolerance(),
            max_duration_minutes: default_max_duration(),
            max_horizon_days: default_max_horizon(),
            allocation_attempts: default_allocation_attempts(),
            ledger: LedgerBackend::default(),
            event_channel_capacity: default_event_capacity(),
        }
    }
}

impl SchedulingConfig {
    /// Reject settings the allocator cannot work with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.allocation_attempts == 0 {
            return Err(AppError::configuration(
                "scheduling.allocation_attempts must be at least 1",
            ));
        }
        if self.max_duration_minutes == 0 {
            return Err(AppError::configuration(
                "scheduling.max_duration_minutes must be at least 1",
            ));
        }
        if self.max_horizon_days == 0 || self.max_horizon_days > MAX_HORIZON_DAYS {
            return Err(AppError::configuration(format!(
                "scheduling.max_horizon_days must be between 1 and {MAX_HORIZON_DAYS}"
            )));
        }
        if self.past_tolerance_seconds > MAX_PAST_TOLERANCE_SECONDS {
            return Err(AppError::configuration(format!(
                "scheduling.past_tolerance_seconds must not exceed {MAX_PAST_TOLERANCE_SECONDS}"
            )));
        }
        if self.event_channel_capacity == 0 {
            return Err(AppError::configuration(
                "scheduling.event_channel_capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

fn default_past_tolerance() -> u64 {
    60
}

fn default_max_duration() -> u32 {
    24 * 60
}

fn default_max_horizon() -> u32 {
    730
}

fn default_allocation_attempts() -> u32 {
    3
}

fn default_event_capacity() -> usize {
    256
}
