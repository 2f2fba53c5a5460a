//! Availability resolution: which licenses are free for a window.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use livehub_core::error::AppError;
use livehub_core::result::AppResult;
use livehub_core::types::id::{BookingId, LicenseId};
use livehub_core::types::window::{Interval, Window};
use livehub_entity::booking::Booking;
use livehub_entity::license::License;

use crate::ledger::BookingLedger;

/// Free and busy license counts for one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolUsage {
    /// The window the counts apply to.
    pub window: Window,
    /// Active licenses in the pool.
    pub active_licenses: usize,
    /// Active licenses held by an overlapping booking.
    pub busy_licenses: usize,
    /// Active licenses that could take a new booking.
    pub free_licenses: usize,
}

/// Filter `licenses` down to those no booking in `bookings` holds during
/// `interval`.
///
/// `bookings` may be a superset of the overlapping ones; the strict overlap
/// test is applied here. The excluded booking (the one being moved) and
/// bookings without a license never block anything. Input order is kept.
pub fn resolve_available(
    licenses: Vec<License>,
    bookings: &[Booking],
    interval: &Interval,
    exclude: Option<BookingId>,
) -> Vec<License> {
    if bookings.is_empty() {
        return licenses;
    }

    let busy: HashSet<LicenseId> = bookings
        .iter()
        .filter(|b| Some(b.id) != exclude)
        .filter(|b| b.interval().overlaps(interval))
        .filter_map(|b| b.license_id)
        .collect();

    licenses
        .into_iter()
        .filter(|l| !busy.contains(&l.id))
        .collect()
}

/// Read-only view over the ledger answering availability questions.
#[derive(Debug, Clone)]
pub struct AvailabilityResolver {
    ledger: Arc<dyn BookingLedger>,
}

impl AvailabilityResolver {
    /// Create a resolver over a ledger.
    pub fn new(ledger: Arc<dyn BookingLedger>) -> Self {
        Self { ledger }
    }

    /// Active licenses free for `window`, ordered by ID. May be empty.
    pub async fn available_licenses(
        &self,
        window: &Window,
        exclude: Option<BookingId>,
    ) -> AppResult<Vec<License>> {
        let licenses = self.ledger.active_licenses().await?;
        self.free_among(licenses, window, exclude).await
    }

    /// Narrow an already-read set of active licenses to the free ones.
    async fn free_among(
        &self,
        licenses: Vec<License>,
        window: &Window,
        exclude: Option<BookingId>,
    ) -> AppResult<Vec<License>> {
        let interval = window.interval();
        if licenses.is_empty() {
            return Ok(licenses);
        }

        let bookings = self.ledger.bookings_overlapping(&interval).await?;
        let available = resolve_available(licenses, &bookings, &interval, exclude);

        debug!(
            start_time = %window.start_time,
            duration_minutes = window.duration_minutes,
            overlapping = bookings.len(),
            available = available.len(),
            "Resolved license availability"
        );
        Ok(available)
    }

    /// IDs of the licenses free for `window`.
    ///
    /// Reports [`LicensesExhausted`](livehub_core::error::ErrorKind::LicensesExhausted)
    /// instead of returning an empty list.
    pub async fn find_available_licenses(
        &self,
        window: &Window,
        exclude: Option<BookingId>,
    ) -> AppResult<Vec<LicenseId>> {
        let available = self.available_licenses(window, exclude).await?;
        if available.is_empty() {
            return Err(exhausted(window));
        }
        Ok(available.into_iter().map(|l| l.id).collect())
    }

    /// Pool occupancy for `window`. Never fails on exhaustion.
    ///
    /// All counts come from a single read of the active pool.
    pub async fn pool_usage(&self, window: &Window) -> AppResult<PoolUsage> {
        let licenses = self.ledger.active_licenses().await?;
        let active = licenses.len();
        let free = self.free_among(licenses, window, None).await?.len();
        Ok(PoolUsage {
            window: *window,
            active_licenses: active,
            busy_licenses: active.saturating_sub(free),
            free_licenses: free,
        })
    }
}

/// The error reported when no license is free for `window`.
pub(crate) fn exhausted(window: &Window) -> AppError {
    AppError::licenses_exhausted(format!(
        "No license available for {} ({} minutes)",
        window.start_time.to_rfc3339(),
        window.duration_minutes
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use livehub_core::types::id::LessonId;
    use livehub_entity::booking::BookingStatus;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, hour, minute, 0).unwrap()
    }

    fn license() -> License {
        License {
            id: LicenseId::new(),
            email: format!("{}@example.com", LicenseId::new()),
            host_id: None,
            capacity: 100,
            is_active: true,
            created_at: at(0, 0),
            updated_at: at(0, 0),
        }
    }

    fn booking(license_id: Option<LicenseId>, start: DateTime<Utc>, minutes: i64) -> Booking {
        Booking {
            id: BookingId::new(),
            lesson_id: LessonId::new(),
            topic: "Chemistry".to_string(),
            license_id,
            start_time: start,
            duration_seconds: (minutes * 60) as i32,
            end_time: start + Duration::minutes(minutes),
            meeting_number: None,
            passcode: None,
            status: BookingStatus::Assigned,
            revision: 1,
            created_at: start,
            updated_at: start,
        }
    }

    fn ids(licenses: &[License]) -> Vec<LicenseId> {
        licenses.iter().map(|l| l.id).collect()
    }

    #[test]
    fn test_no_bookings_means_everything_free() {
        let pool = vec![license(), license()];
        let interval = Window::new(at(10, 0), 60).interval();
        let free = resolve_available(pool.clone(), &[], &interval, None);
        assert_eq!(ids(&free), ids(&pool));
    }

    #[test]
    fn test_overlapping_booking_blocks_its_license() {
        let (l1, l2) = (license(), license());
        let bookings = vec![booking(Some(l1.id), at(10, 0), 60)];
        let interval = Window::new(at(10, 30), 60).interval();
        let free = resolve_available(vec![l1, l2.clone()], &bookings, &interval, None);
        assert_eq!(ids(&free), vec![l2.id]);
    }

    #[test]
    fn test_touching_booking_does_not_block() {
        let l1 = license();
        let bookings = vec![booking(Some(l1.id), at(10, 0), 30)];
        let interval = Window::new(at(10, 30), 30).interval();
        let free = resolve_available(vec![l1.clone()], &bookings, &interval, None);
        assert_eq!(ids(&free), vec![l1.id]);
    }

    #[test]
    fn test_excluded_booking_frees_its_own_license() {
        let l1 = license();
        let own = booking(Some(l1.id), at(10, 0), 60);
        let interval = Window::new(at(10, 15), 60).interval();

        assert!(resolve_available(vec![l1.clone()], &[own.clone()], &interval, None).is_empty());
        let free = resolve_available(vec![l1.clone()], &[own.clone()], &interval, Some(own.id));
        assert_eq!(ids(&free), vec![l1.id]);
    }

    #[test]
    fn test_unbound_booking_blocks_nothing() {
        let l1 = license();
        let bookings = vec![booking(None, at(10, 0), 60)];
        let interval = Window::new(at(10, 0), 60).interval();
        assert_eq!(resolve_available(vec![l1], &bookings, &interval, None).len(), 1);
    }

    #[test]
    fn test_non_overlapping_candidates_are_ignored() {
        let l1 = license();
        let bookings = vec![booking(Some(l1.id), at(8, 0), 60)];
        let interval = Window::new(at(10, 0), 60).interval();
        assert_eq!(resolve_available(vec![l1], &bookings, &interval, None).len(), 1);
    }
}
