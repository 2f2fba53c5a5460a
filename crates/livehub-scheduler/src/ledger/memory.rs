//! In-memory booking ledger using a Tokio mutex for single-node deployments.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use livehub_core::error::AppError;
use livehub_core::result::AppResult;
use livehub_core::traits::RemoteMeeting;
use livehub_core::types::id::{BookingId, LessonId, LicenseId};
use livehub_core::types::window::Interval;
use livehub_entity::booking::{Booking, BookingStatus, Reservation, Reserved};
use livehub_entity::license::{CreateLicense, License};

use super::BookingLedger;

/// Internal state for the memory ledger.
#[derive(Debug, Default)]
struct InnerState {
    /// Licenses keyed (and therefore ordered) by ID.
    licenses: BTreeMap<LicenseId, License>,
    /// All bookings.
    bookings: HashMap<BookingId, Booking>,
}

impl InnerState {
    /// The booking, if it still carries `revision`.
    fn booking_at(&mut self, id: BookingId, revision: i64) -> Option<&mut Booking> {
        self.bookings.get_mut(&id).filter(|b| b.revision == revision)
    }
}

/// In-memory ledger. Every operation runs under one Tokio mutex, which
/// makes [`reserve`](BookingLedger::reserve) trivially atomic.
///
/// Suitable for single-node deployments and tests only.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingLedger for MemoryLedger {
    async fn active_licenses(&self) -> AppResult<Vec<License>> {
        let state = self.state.lock().await;
        Ok(state
            .licenses
            .values()
            .filter(|l| l.is_active)
            .cloned()
            .collect())
    }

    async fn list_licenses(&self) -> AppResult<Vec<License>> {
        let state = self.state.lock().await;
        Ok(state.licenses.values().cloned().collect())
    }

    async fn create_license(&self, data: &CreateLicense) -> AppResult<License> {
        let mut state = self.state.lock().await;

        if state.licenses.values().any(|l| l.email == data.email) {
            return Err(AppError::conflict(format!(
                "License with email '{}' already exists",
                data.email
            )));
        }

        let now = Utc::now();
        let license = License {
            id: LicenseId::new(),
            email: data.email.clone(),
            host_id: data.host_id.clone(),
            capacity: data.capacity,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.licenses.insert(license.id, license.clone());

        info!(license_id = %license.id, email = %license.email, "License registered");
        Ok(license)
    }

    async fn set_license_active(&self, id: LicenseId, active: bool) -> AppResult<Option<License>> {
        let mut state = self.state.lock().await;
        Ok(state.licenses.get_mut(&id).map(|license| {
            license.is_active = active;
            license.updated_at = Utc::now();
            license.clone()
        }))
    }

    async fn find_booking(&self, id: BookingId) -> AppResult<Option<Booking>> {
        let state = self.state.lock().await;
        Ok(state.bookings.get(&id).cloned())
    }

    async fn find_booking_for_lesson(&self, lesson_id: LessonId) -> AppResult<Option<Booking>> {
        let state = self.state.lock().await;
        Ok(state
            .bookings
            .values()
            .find(|b| b.lesson_id == lesson_id)
            .cloned())
    }

    async fn bookings_overlapping(&self, interval: &Interval) -> AppResult<Vec<Booking>> {
        let state = self.state.lock().await;
        let mut found: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| b.license_id.is_some() && b.interval().overlaps(interval))
            .cloned()
            .collect();
        found.sort_by_key(|b| (b.start_time, b.id));
        Ok(found)
    }

    async fn list_bookings(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        let state = self.state.lock().await;
        let mut found: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| b.start_time >= from && b.start_time < to)
            .cloned()
            .collect();
        found.sort_by_key(|b| (b.start_time, b.id));
        Ok(found)
    }

    async fn reserve(&self, reservation: &Reservation) -> AppResult<Reserved> {
        let mut state = self.state.lock().await;
        let interval = reservation.window.interval();

        match state.licenses.get(&reservation.license_id) {
            None => {
                return Err(AppError::not_found(format!(
                    "License {} not found",
                    reservation.license_id
                )));
            }
            Some(license) if !license.is_active => {
                return Err(AppError::allocation_conflict(format!(
                    "License {} was deactivated",
                    reservation.license_id
                )));
            }
            Some(_) => {}
        }

        let taken = state.bookings.values().any(|b| {
            b.id != reservation.booking_id && b.blocks(reservation.license_id, &interval)
        });
        if taken {
            debug!(license_id = %reservation.license_id, "License taken between resolve and reserve");
            return Err(AppError::allocation_conflict(format!(
                "License {} already booked for an overlapping window",
                reservation.license_id
            )));
        }

        let lesson_taken = state
            .bookings
            .values()
            .any(|b| b.lesson_id == reservation.lesson_id && b.id != reservation.booking_id);
        if lesson_taken {
            return Err(AppError::conflict(format!(
                "Lesson {} already has a booking",
                reservation.lesson_id
            )));
        }

        let now = Utc::now();
        let displaced_meeting = state
            .bookings
            .get(&reservation.booking_id)
            .and_then(|b| b.meeting_number);
        let booking = state
            .bookings
            .entry(reservation.booking_id)
            .and_modify(|b| {
                b.topic = reservation.topic.clone();
                b.license_id = Some(reservation.license_id);
                b.start_time = interval.start;
                b.duration_seconds = reservation.window.duration_seconds() as i32;
                b.end_time = interval.end;
                b.meeting_number = None;
                b.passcode = None;
                b.status = BookingStatus::Assigned;
                b.revision += 1;
                b.updated_at = now;
            })
            .or_insert_with(|| Booking {
                id: reservation.booking_id,
                lesson_id: reservation.lesson_id,
                topic: reservation.topic.clone(),
                license_id: Some(reservation.license_id),
                start_time: interval.start,
                duration_seconds: reservation.window.duration_seconds() as i32,
                end_time: interval.end,
                meeting_number: None,
                passcode: None,
                status: BookingStatus::Assigned,
                revision: 1,
                created_at: now,
                updated_at: now,
            });

        Ok(Reserved {
            booking: booking.clone(),
            displaced_meeting,
        })
    }

    async fn materialize(
        &self,
        id: BookingId,
        revision: i64,
        meeting: &RemoteMeeting,
    ) -> AppResult<Option<Booking>> {
        let mut state = self.state.lock().await;
        Ok(state.booking_at(id, revision).map(|b| {
            b.meeting_number = Some(meeting.meeting_number);
            b.passcode = Some(meeting.passcode.clone());
            b.status = BookingStatus::Materialized;
            b.updated_at = Utc::now();
            b.clone()
        }))
    }

    async fn release(&self, id: BookingId, revision: i64) -> AppResult<Option<Booking>> {
        let mut state = self.state.lock().await;
        Ok(state.booking_at(id, revision).map(|b| {
            b.license_id = None;
            b.meeting_number = None;
            b.passcode = None;
            b.status = BookingStatus::PendingAssignment;
            b.updated_at = Utc::now();
            b.clone()
        }))
    }

    async fn remove(&self, id: BookingId, revision: Option<i64>) -> AppResult<Option<Booking>> {
        let mut state = self.state.lock().await;
        if let Some(revision) = revision {
            if state.booking_at(id, revision).is_none() {
                return Ok(None);
            }
        }
        Ok(state.bookings.remove(&id))
    }
}
