//! License allocator: the booking lifecycle for live-class meetings.
//!
//! A booking moves through `PendingAssignment -> Assigned -> Materialized`
//! and is deleted when unscheduled. Rescheduling re-runs the assignment for
//! the same booking, keeping its license when that license is still free.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use livehub_core::config::SchedulingConfig;
use livehub_core::error::{AppError, ErrorKind};
use livehub_core::events::{DomainEvent, EventBus, MeetingEvent};
use livehub_core::result::AppResult;
use livehub_core::traits::{
    Clock, CreateMeetingRequest, MeetingProvider, RemoteMeeting, SystemClock,
};
use livehub_core::types::id::{BookingId, LessonId, LicenseId};
use livehub_core::types::window::Window;
use livehub_entity::booking::{Booking, Reservation, Reserved};
use livehub_entity::license::{CreateLicense, License};

use crate::availability::{self, AvailabilityResolver, PoolUsage};
use crate::ledger::BookingLedger;

/// A request to schedule (or reschedule) the meeting of a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Lesson the meeting belongs to.
    pub lesson_id: LessonId,
    /// Meeting title.
    pub topic: String,
    /// Requested slot.
    pub window: Window,
}

/// A materialized booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingResult {
    /// Booking ID.
    pub booking_id: BookingId,
    /// Owning lesson.
    pub lesson_id: LessonId,
    /// License hosting the meeting.
    pub license_id: LicenseId,
    /// Provider meeting number.
    pub meeting_number: i64,
    /// Join passcode.
    pub passcode: String,
    /// Booked slot.
    pub window: Window,
}

/// Assigns licenses to lesson meetings and manages their remote rooms.
#[derive(Debug, Clone)]
pub struct LicenseAllocator {
    ledger: Arc<dyn BookingLedger>,
    provider: Arc<dyn MeetingProvider>,
    resolver: AvailabilityResolver,
    clock: Arc<dyn Clock>,
    events: EventBus,
    config: SchedulingConfig,
    provider_timeout: Duration,
}

impl LicenseAllocator {
    /// Create an allocator using the system clock and a fresh event bus.
    pub fn new(
        ledger: Arc<dyn BookingLedger>,
        provider: Arc<dyn MeetingProvider>,
        config: SchedulingConfig,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            resolver: AvailabilityResolver::new(Arc::clone(&ledger)),
            events: EventBus::new(config.event_channel_capacity),
            clock: Arc::new(SystemClock),
            ledger,
            provider,
            config,
            provider_timeout,
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Publish lifecycle events on an existing bus.
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// The bus lifecycle events are published on.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// The availability resolver over the same ledger.
    pub fn resolver(&self) -> &AvailabilityResolver {
        &self.resolver
    }

    // ── Scheduling ──

    /// Schedule the lesson's meeting, or move it if one already exists.
    ///
    /// On exhaustion an existing booking is left exactly as it was. When
    /// the provider fails, the booking is kept without a license and the
    /// provider error is returned. If the returned future is dropped after
    /// the license was bound, the binding is rolled back in the background.
    /// When a concurrent call reschedules or removes the booking before the
    /// new meeting is recorded, that meeting is deleted again and this call
    /// reports a conflict.
    pub async fn schedule(&self, request: ScheduleRequest) -> AppResult<BookingResult> {
        match self.schedule_inner(&request).await {
            Ok(result) => Ok(result),
            Err(err) => {
                if matches!(
                    err.kind,
                    ErrorKind::LicensesExhausted | ErrorKind::ExternalService
                ) {
                    self.publish(MeetingEvent::AllocationFailed {
                        lesson_id: request.lesson_id,
                        reason: err.to_string(),
                    });
                }
                Err(err)
            }
        }
    }

    async fn schedule_inner(&self, request: &ScheduleRequest) -> AppResult<BookingResult> {
        self.validate_window(&request.window)?;

        let existing = self
            .ledger
            .find_booking_for_lesson(request.lesson_id)
            .await?;
        let booking_id = existing.as_ref().map_or_else(BookingId::new, |b| b.id);

        let (license, reserved) = self.bind(request, booking_id, existing.as_ref()).await?;
        let revision = reserved.booking.revision;

        let mut guard = RollbackGuard::new(
            Arc::clone(&self.ledger),
            booking_id,
            revision,
            if existing.is_some() {
                Rollback::Release
            } else {
                Rollback::Remove
            },
        );

        // Old room is deleted before its replacement is created.
        let previous_meeting = reserved.displaced_meeting;
        if let Some(number) = previous_meeting {
            self.delete_remote(number).await;
        }

        let create = CreateMeetingRequest {
            topic: request.topic.clone(),
            start_time: request.window.start_time,
            duration_minutes: request.window.duration_minutes,
            owner_identity: license.owner_identity().to_string(),
            previous_meeting_number: previous_meeting,
        };

        let meeting = match self.create_remote(&create).await {
            Ok(meeting) => meeting,
            Err(err) => {
                warn!(
                    booking_id = %booking_id,
                    license_id = %license.id,
                    error = %err,
                    "Meeting creation failed; releasing license"
                );
                self.ledger.release(booking_id, revision).await?;
                guard.disarm();
                return Err(err);
            }
        };

        match self.ledger.materialize(booking_id, revision, &meeting).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                // Unscheduled or re-reserved while the room was being created.
                warn!(
                    booking_id = %booking_id,
                    meeting_number = meeting.meeting_number,
                    "Booking changed during scheduling; discarding new meeting"
                );
                self.delete_remote(meeting.meeting_number).await;
                guard.disarm();
                return Err(AppError::conflict(format!(
                    "Booking {booking_id} was removed or rescheduled concurrently"
                )));
            }
            Err(err) => {
                self.delete_remote(meeting.meeting_number).await;
                return Err(err);
            }
        }
        guard.disarm();

        info!(
            booking_id = %booking_id,
            lesson_id = %request.lesson_id,
            license_id = %license.id,
            meeting_number = meeting.meeting_number,
            rescheduled = existing.is_some(),
            "Meeting scheduled"
        );

        let event = match &existing {
            Some(previous) => MeetingEvent::Rescheduled {
                booking_id,
                lesson_id: request.lesson_id,
                previous_license_id: previous.license_id,
                license_id: license.id,
                start_time: request.window.start_time,
                duration_minutes: request.window.duration_minutes,
            },
            None => MeetingEvent::Scheduled {
                booking_id,
                lesson_id: request.lesson_id,
                license_id: license.id,
                start_time: request.window.start_time,
                duration_minutes: request.window.duration_minutes,
            },
        };
        self.publish(event);

        Ok(BookingResult {
            booking_id,
            lesson_id: request.lesson_id,
            license_id: license.id,
            meeting_number: meeting.meeting_number,
            passcode: meeting.passcode,
            window: request.window,
        })
    }

    /// Resolve, pick and reserve, re-resolving after each lost race.
    async fn bind(
        &self,
        request: &ScheduleRequest,
        booking_id: BookingId,
        existing: Option<&Booking>,
    ) -> AppResult<(License, Reserved)> {
        let exclude = existing.map(|b| b.id);
        let current = existing.and_then(|b| b.license_id);

        for attempt in 1..=self.config.allocation_attempts {
            let candidates = self
                .resolver
                .available_licenses(&request.window, exclude)
                .await?;
            let Some(license) = pick_license(&candidates, current) else {
                return Err(availability::exhausted(&request.window));
            };

            let reservation = Reservation {
                booking_id,
                lesson_id: request.lesson_id,
                topic: request.topic.clone(),
                license_id: license.id,
                window: request.window,
            };

            match self.ledger.reserve(&reservation).await {
                Ok(reserved) => return Ok((license.clone(), reserved)),
                Err(err) if err.is_allocation_conflict() => {
                    debug!(
                        attempt,
                        license_id = %license.id,
                        lesson_id = %request.lesson_id,
                        "Lost allocation race; re-resolving"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        warn!(
            lesson_id = %request.lesson_id,
            attempts = self.config.allocation_attempts,
            "Allocation retries exhausted"
        );
        Err(AppError::licenses_exhausted(format!(
            "No license could be reserved after {} attempts",
            self.config.allocation_attempts
        )))
    }

    // ── Unscheduling ──

    /// Remove a booking and its remote meeting. Unknown IDs are a no-op.
    pub async fn unschedule(&self, booking_id: BookingId) -> AppResult<()> {
        match self.ledger.find_booking(booking_id).await? {
            Some(booking) => self.retire(booking).await,
            None => {
                debug!(booking_id = %booking_id, "Unschedule of unknown booking ignored");
                Ok(())
            }
        }
    }

    /// Remove the lesson's booking, if it has one.
    pub async fn unschedule_lesson(&self, lesson_id: LessonId) -> AppResult<()> {
        match self.ledger.find_booking_for_lesson(lesson_id).await? {
            Some(booking) => self.retire(booking).await,
            None => {
                debug!(lesson_id = %lesson_id, "Lesson has no booking to unschedule");
                Ok(())
            }
        }
    }

    async fn retire(&self, booking: Booking) -> AppResult<()> {
        if let Some(number) = booking.meeting_number {
            self.delete_remote(number).await;
        }

        if self.ledger.remove(booking.id, None).await?.is_none() {
            debug!(booking_id = %booking.id, "Booking already removed");
            return Ok(());
        }

        info!(
            booking_id = %booking.id,
            lesson_id = %booking.lesson_id,
            license_id = ?booking.license_id,
            "Meeting unscheduled"
        );
        self.publish(MeetingEvent::Unscheduled {
            booking_id: booking.id,
            lesson_id: booking.lesson_id,
            license_id: booking.license_id,
        });
        Ok(())
    }

    // ── Queries ──

    /// Look up a booking.
    pub async fn get_booking(&self, booking_id: BookingId) -> AppResult<Booking> {
        self.ledger
            .find_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {booking_id} not found")))
    }

    /// Look up the booking of a lesson.
    pub async fn booking_for_lesson(&self, lesson_id: LessonId) -> AppResult<Booking> {
        self.ledger
            .find_booking_for_lesson(lesson_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Lesson {lesson_id} has no meeting")))
    }

    /// Bookings starting in `[from, to)`.
    pub async fn list_bookings(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        if from >= to {
            return Err(AppError::validation("'from' must be before 'to'"));
        }
        self.ledger.list_bookings(from, to).await
    }

    /// IDs of licenses free for `window`; exhaustion is an error.
    pub async fn find_available_licenses(
        &self,
        window: &Window,
        exclude: Option<BookingId>,
    ) -> AppResult<Vec<LicenseId>> {
        self.validate_bounds(window)?;
        self.resolver.find_available_licenses(window, exclude).await
    }

    /// Pool occupancy for `window`.
    pub async fn pool_usage(&self, window: &Window) -> AppResult<PoolUsage> {
        self.validate_bounds(window)?;
        self.resolver.pool_usage(window).await
    }

    // ── License administration ──

    /// Register a license in the pool.
    pub async fn create_license(&self, data: CreateLicense) -> AppResult<License> {
        let email = data.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::validation("License email must be an e-mail address"));
        }
        if data.capacity <= 0 {
            return Err(AppError::validation("License capacity must be positive"));
        }

        let data = CreateLicense {
            email: email.to_string(),
            ..data
        };
        let license = self.ledger.create_license(&data).await?;
        info!(license_id = %license.id, email = %license.email, "License added to pool");
        Ok(license)
    }

    /// All licenses, active or not.
    pub async fn list_licenses(&self) -> AppResult<Vec<License>> {
        self.ledger.list_licenses().await
    }

    /// Enable or disable a license for future bookings. Existing bookings
    /// on it are kept.
    pub async fn set_license_active(&self, id: LicenseId, active: bool) -> AppResult<License> {
        let license = self
            .ledger
            .set_license_active(id, active)
            .await?
            .ok_or_else(|| AppError::not_found(format!("License {id} not found")))?;
        info!(license_id = %id, active, "License availability changed");
        Ok(license)
    }

    // ── Helpers ──

    fn validate_bounds(&self, window: &Window) -> AppResult<()> {
        if window.duration_minutes == 0 {
            return Err(AppError::validation("Duration must be at least one minute"));
        }
        if window.duration_minutes > self.config.max_duration_minutes {
            return Err(AppError::validation(format!(
                "Duration must not exceed {} minutes",
                self.config.max_duration_minutes
            )));
        }
        if window.try_interval().is_none() {
            return Err(AppError::validation("Window ends past the supported calendar range"));
        }

        let horizon = chrono::Duration::days(i64::from(self.config.max_horizon_days));
        let latest = self
            .clock
            .now()
            .checked_add_signed(horizon)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        if window.start_time > latest {
            return Err(AppError::validation(format!(
                "Start time must be within {} days from now",
                self.config.max_horizon_days
            )));
        }
        Ok(())
    }

    fn validate_window(&self, window: &Window) -> AppResult<()> {
        self.validate_bounds(window)?;

        let tolerance = chrono::Duration::seconds(self.config.past_tolerance_seconds as i64);
        let earliest = self.clock.now() - tolerance;
        if window.start_time < earliest {
            return Err(AppError::validation(format!(
                "Start time {} is in the past",
                window.start_time.to_rfc3339()
            )));
        }
        Ok(())
    }

    async fn create_remote(
        &self,
        request: &CreateMeetingRequest,
    ) -> AppResult<RemoteMeeting> {
        match tokio::time::timeout(self.provider_timeout, self.provider.create_meeting(request))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(AppError::provider(format!(
                "{} did not create the meeting within {}s",
                self.provider.name(),
                self.provider_timeout.as_secs()
            ))),
        }
    }

    /// Best-effort remote delete; failures are logged and swallowed.
    async fn delete_remote(&self, meeting_number: i64) {
        let outcome = tokio::time::timeout(
            self.provider_timeout,
            self.provider.delete_meeting(meeting_number),
        )
        .await;

        match outcome {
            Ok(Ok(())) => debug!(meeting_number, "Remote meeting deleted"),
            Ok(Err(err)) => warn!(
                meeting_number,
                error = %err,
                "Failed to delete remote meeting; continuing"
            ),
            Err(_) => warn!(
                meeting_number,
                "Timed out deleting remote meeting; continuing"
            ),
        }
    }

    fn publish(&self, payload: MeetingEvent) {
        self.events
            .publish(DomainEvent::new(self.clock.now(), payload));
    }
}

/// Keep the currently bound license when it is still free, otherwise take
/// the lowest ID.
fn pick_license(candidates: &[License], current: Option<LicenseId>) -> Option<&License> {
    current
        .and_then(|id| candidates.iter().find(|l| l.id == id))
        .or_else(|| candidates.iter().min_by_key(|l| l.id))
}

/// What to undo if scheduling is abandoned after the license was bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rollback {
    /// The booking was created by this call: delete it.
    Remove,
    /// The booking existed before: drop its binding.
    Release,
}

/// Undoes a reservation when dropped while still armed.
struct RollbackGuard {
    ledger: Arc<dyn BookingLedger>,
    booking_id: BookingId,
    revision: i64,
    action: Option<Rollback>,
}

impl RollbackGuard {
    fn new(
        ledger: Arc<dyn BookingLedger>,
        booking_id: BookingId,
        revision: i64,
        action: Rollback,
    ) -> Self {
        Self {
            ledger,
            booking_id,
            revision,
            action: Some(action),
        }
    }

    fn disarm(&mut self) {
        self.action = None;
    }
}

impl Drop for RollbackGuard {
    fn drop(&mut self) {
        let Some(action) = self.action.take() else {
            return;
        };

        let ledger = Arc::clone(&self.ledger);
        let booking_id = self.booking_id;
        let revision = self.revision;
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(booking_id = %booking_id, ?action, "No runtime to roll back abandoned booking");
            return;
        };

        handle.spawn(async move {
            let outcome = match action {
                Rollback::Remove => ledger.remove(booking_id, Some(revision)).await,
                Rollback::Release => ledger.release(booking_id, revision).await,
            };
            match outcome {
                Ok(_) => info!(booking_id = %booking_id, ?action, "Abandoned booking rolled back"),
                Err(err) => warn!(
                    booking_id = %booking_id,
                    ?action,
                    error = %err,
                    "Failed to roll back abandoned booking"
                ),
            }
        });
    }
}
