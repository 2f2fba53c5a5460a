//! Time windows occupied by bookings.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A requested meeting slot: a start instant plus a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// Absolute start time (UTC).
    pub start_time: DateTime<Utc>,
    /// Length of the meeting in minutes.
    pub duration_minutes: u32,
}

impl Window {
    /// Create a window.
    pub fn new(start_time: DateTime<Utc>, duration_minutes: u32) -> Self {
        Self {
            start_time,
            duration_minutes,
        }
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> i64 {
        i64::from(self.duration_minutes) * 60
    }

    /// Exclusive end of the window, or `None` past the representable range.
    pub fn try_end_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
            .checked_add_signed(Duration::minutes(i64::from(self.duration_minutes)))
    }

    /// Exclusive end of the window, saturating at the latest representable
    /// instant.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.try_end_time().unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// The half-open interval `[start, end)`, or `None` if the end does not
    /// exist.
    pub fn try_interval(&self) -> Option<Interval> {
        self.try_end_time()
            .map(|end| Interval::new(self.start_time, end))
    }

    /// The half-open interval `[start, end)` covered by this window.
    pub fn interval(&self) -> Interval {
        Interval::new(self.start_time, self.end_time())
    }

    /// Whether two windows share any instant.
    pub fn overlaps(&self, other: &Window) -> bool {
        self.interval().overlaps(&other.interval())
    }
}

/// Half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Create an interval.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Strict overlap: intervals that merely touch do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}
