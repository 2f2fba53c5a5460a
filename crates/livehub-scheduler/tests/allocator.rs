mod common;

use chrono::Duration as ChronoDuration;

use livehub_core::error::ErrorKind;
use livehub_core::events::MeetingEvent;
use livehub_core::types::id::{BookingId, LessonId};
use livehub_core::types::window::Window;
use livehub_entity::booking::BookingStatus;
use livehub_scheduler::BookingLedger;

use common::{at, harness, request};

#[tokio::test]
async fn test_two_licenses_third_overlapping_lesson_is_exhausted() {
    let h = harness(2).await;
    let (l1, l2) = (h.licenses[0].id, h.licenses[1].id);

    let a = h
        .allocator
        .schedule(request(LessonId::new(), at(10, 0), 60))
        .await
        .unwrap();
    let b = h
        .allocator
        .schedule(request(LessonId::new(), at(10, 30), 60))
        .await
        .unwrap();
    let c = h
        .allocator
        .schedule(request(LessonId::new(), at(10, 45), 30))
        .await
        .unwrap_err();

    assert_eq!(a.license_id, l1);
    assert_eq!(b.license_id, l2);
    assert_eq!(c.kind, ErrorKind::LicensesExhausted);
    assert_eq!(h.provider.meeting_count(), 2);
}

#[tokio::test]
async fn test_k_overlapping_bookings_get_distinct_licenses() {
    let h = harness(4).await;
    let mut used = Vec::new();
    for _ in 0..4 {
        let result = h
            .allocator
            .schedule(request(LessonId::new(), at(14, 0), 45))
            .await
            .unwrap();
        used.push(result.license_id);
    }
    used.sort();
    used.dedup();
    assert_eq!(used.len(), 4);

    let err = h
        .allocator
        .schedule(request(LessonId::new(), at(14, 30), 10))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::LicensesExhausted);
}

#[tokio::test]
async fn test_adjacent_windows_share_a_license() {
    let h = harness(1).await;
    let first = h
        .allocator
        .schedule(request(LessonId::new(), at(10, 0), 30))
        .await
        .unwrap();
    let second = h
        .allocator
        .schedule(request(LessonId::new(), at(10, 30), 30))
        .await
        .unwrap();
    assert_eq!(first.license_id, second.license_id);
}

#[tokio::test]
async fn test_reschedule_keeps_own_license() {
    let h = harness(2).await;
    let (l1, l2) = (h.licenses[0].id, h.licenses[1].id);

    // Push the lesson onto the higher license, then free the lower one.
    let blocker = h
        .allocator
        .schedule(request(LessonId::new(), at(10, 0), 60))
        .await
        .unwrap();
    let lesson = LessonId::new();
    let first = h
        .allocator
        .schedule(request(lesson, at(10, 0), 60))
        .await
        .unwrap();
    assert_eq!(blocker.license_id, l1);
    assert_eq!(first.license_id, l2);
    h.allocator.unschedule(blocker.booking_id).await.unwrap();

    let window = Window::new(at(10, 30), 60);
    let free = h
        .allocator
        .find_available_licenses(&window, Some(first.booking_id))
        .await
        .unwrap();
    assert_eq!(free, vec![l1, l2]);

    let moved = h
        .allocator
        .schedule(request(lesson, at(10, 30), 60))
        .await
        .unwrap();
    assert_eq!(moved.booking_id, first.booking_id);
    assert_eq!(moved.license_id, l2);
    assert_ne!(moved.meeting_number, first.meeting_number);

    // Old room deleted, new one created with a reference to it.
    assert!(h.provider.delete_requests().contains(&first.meeting_number));
    assert!(!h.provider.has_meeting(first.meeting_number));
    let last = h.provider.create_requests().pop().unwrap();
    assert_eq!(last.previous_meeting_number, Some(first.meeting_number));

    let booking = h.allocator.get_booking(first.booking_id).await.unwrap();
    assert_eq!(booking.start_time, at(10, 30));
    assert_eq!(booking.status, BookingStatus::Materialized);
}

#[tokio::test]
async fn test_own_license_is_free_for_overlapping_move_when_excluded() {
    let h = harness(1).await;
    let first = h
        .allocator
        .schedule(request(LessonId::new(), at(10, 0), 60))
        .await
        .unwrap();

    let window = Window::new(at(10, 15), 60);
    let err = h
        .allocator
        .find_available_licenses(&window, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::LicensesExhausted);

    let free = h
        .allocator
        .find_available_licenses(&window, Some(first.booking_id))
        .await
        .unwrap();
    assert_eq!(free, vec![first.license_id]);
}

#[tokio::test]
async fn test_reschedule_that_cannot_fit_leaves_booking_untouched() {
    let h = harness(1).await;
    h.allocator
        .schedule(request(LessonId::new(), at(10, 0), 60))
        .await
        .unwrap();
    let lesson = LessonId::new();
    let original = h
        .allocator
        .schedule(request(lesson, at(12, 0), 60))
        .await
        .unwrap();

    let err = h
        .allocator
        .schedule(request(lesson, at(10, 30), 30))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::LicensesExhausted);

    let booking = h.allocator.booking_for_lesson(lesson).await.unwrap();
    assert_eq!(booking.start_time, at(12, 0));
    assert_eq!(booking.license_id, Some(original.license_id));
    assert_eq!(booking.meeting_number, Some(original.meeting_number));
    assert!(h.provider.delete_requests().is_empty());
}

#[tokio::test]
async fn test_unschedule_is_idempotent() {
    let h = harness(1).await;
    let result = h
        .allocator
        .schedule(request(LessonId::new(), at(10, 0), 60))
        .await
        .unwrap();

    h.allocator.unschedule(result.booking_id).await.unwrap();
    h.allocator.unschedule(result.booking_id).await.unwrap();
    h.allocator.unschedule(BookingId::new()).await.unwrap();

    assert!(h.ledger.find_booking(result.booking_id).await.unwrap().is_none());
    assert_eq!(h.provider.delete_requests(), vec![result.meeting_number]);

    // The license is free again.
    let free = h
        .allocator
        .find_available_licenses(&Window::new(at(10, 0), 60), None)
        .await
        .unwrap();
    assert_eq!(free, vec![result.license_id]);
}

#[tokio::test]
async fn test_unschedule_lesson_removes_its_booking() {
    let h = harness(1).await;
    let lesson = LessonId::new();
    h.allocator
        .schedule(request(lesson, at(10, 0), 60))
        .await
        .unwrap();

    h.allocator.unschedule_lesson(lesson).await.unwrap();
    h.allocator.unschedule_lesson(lesson).await.unwrap();

    let err = h.allocator.booking_for_lesson(lesson).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_provider_delete_failure_is_swallowed() {
    let h = harness(1).await;
    let result = h
        .allocator
        .schedule(request(LessonId::new(), at(10, 0), 60))
        .await
        .unwrap();

    h.provider.set_fail_delete(true);
    h.allocator.unschedule(result.booking_id).await.unwrap();

    let err = h.allocator.get_booking(result.booking_id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_provider_create_failure_releases_license() {
    let h = harness(1).await;
    let lesson = LessonId::new();

    h.provider.set_fail_create(true);
    let err = h
        .allocator
        .schedule(request(lesson, at(10, 0), 60))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExternalService);

    let booking = h.allocator.booking_for_lesson(lesson).await.unwrap();
    assert_eq!(booking.status, BookingStatus::PendingAssignment);
    assert!(booking.license_id.is_none());
    assert!(booking.meeting_number.is_none());

    // Another lesson can take the license for the same window.
    h.provider.set_fail_create(false);
    h.allocator
        .schedule(request(LessonId::new(), at(10, 0), 60))
        .await
        .unwrap();

    // A retry for the original lesson reuses its booking row.
    h.allocator
        .schedule(request(lesson, at(12, 0), 60))
        .await
        .unwrap();
    let retried = h.allocator.booking_for_lesson(lesson).await.unwrap();
    assert_eq!(retried.id, booking.id);
    assert_eq!(retried.status, BookingStatus::Materialized);
}

#[tokio::test]
async fn test_past_start_respects_tolerance() {
    let h = harness(1).await;
    h.clock.set(at(10, 0));

    let err = h
        .allocator
        .schedule(request(LessonId::new(), at(9, 58), 30))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let within = at(10, 0) - ChronoDuration::seconds(30);
    h.allocator
        .schedule(request(LessonId::new(), within, 30))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_implausible_durations_are_rejected() {
    let h = harness(1).await;
    for minutes in [0, 24 * 60 + 1] {
        let err = h
            .allocator
            .schedule(request(LessonId::new(), at(10, 0), minutes))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
    assert_eq!(h.provider.create_requests().len(), 0);
}

#[tokio::test]
async fn test_empty_pool_reports_exhaustion() {
    let h = harness(0).await;
    let err = h
        .allocator
        .find_available_licenses(&Window::new(at(10, 0), 60), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::LicensesExhausted);
}

#[tokio::test]
async fn test_deactivated_license_keeps_bookings_but_takes_no_new_ones() {
    let h = harness(2).await;
    let result = h
        .allocator
        .schedule(request(LessonId::new(), at(10, 0), 60))
        .await
        .unwrap();

    h.allocator
        .set_license_active(result.license_id, false)
        .await
        .unwrap();

    assert!(h.allocator.get_booking(result.booking_id).await.is_ok());
    let free = h
        .allocator
        .find_available_licenses(&Window::new(at(15, 0), 60), None)
        .await
        .unwrap();
    assert_eq!(free, vec![h.licenses[1].id]);
}

#[tokio::test]
async fn test_pool_usage_counts_busy_licenses() {
    let h = harness(3).await;
    h.allocator
        .schedule(request(LessonId::new(), at(10, 0), 60))
        .await
        .unwrap();

    let usage = h
        .allocator
        .pool_usage(&Window::new(at(10, 30), 30))
        .await
        .unwrap();
    assert_eq!(usage.active_licenses, 3);
    assert_eq!(usage.busy_licenses, 1);
    assert_eq!(usage.free_licenses, 2);
}

#[tokio::test]
async fn test_list_bookings_filters_by_start() {
    let h = harness(2).await;
    for hour in [9, 11, 13] {
        h.allocator
            .schedule(request(LessonId::new(), at(hour, 0), 30))
            .await
            .unwrap();
    }

    let listed = h.allocator.list_bookings(at(10, 0), at(13, 0)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].start_time, at(11, 0));

    let err = h
        .allocator
        .list_bookings(at(13, 0), at(10, 0))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_lifecycle_events_are_published() {
    let h = harness(1).await;
    let mut events = h.allocator.events().subscribe();
    let lesson = LessonId::new();

    let result = h
        .allocator
        .schedule(request(lesson, at(10, 0), 60))
        .await
        .unwrap();
    h.allocator
        .schedule(request(lesson, at(11, 0), 60))
        .await
        .unwrap();
    h.allocator
        .schedule(request(LessonId::new(), at(11, 30), 60))
        .await
        .unwrap_err();
    h.allocator.unschedule(result.booking_id).await.unwrap();

    let kinds: Vec<&'static str> = [
        events.recv().await.unwrap(),
        events.recv().await.unwrap(),
        events.recv().await.unwrap(),
        events.recv().await.unwrap(),
    ]
    .iter()
    .map(|e| match e.payload {
        MeetingEvent::Scheduled { .. } => "scheduled",
        MeetingEvent::Rescheduled { .. } => "rescheduled",
        MeetingEvent::AllocationFailed { .. } => "failed",
        MeetingEvent::Unscheduled { .. } => "unscheduled",
    })
    .collect();

    assert_eq!(kinds, vec!["scheduled", "rescheduled", "failed", "unscheduled"]);
}

#[tokio::test]
async fn test_license_admin_validates_input() {
    let h = harness(0).await;
    let err = h
        .allocator
        .create_license(livehub_entity::license::CreateLicense {
            email: "not-an-email".to_string(),
            host_id: None,
            capacity: 10,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = h
        .allocator
        .set_license_active(livehub_core::types::id::LicenseId::new(), true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_windows_past_the_calendar_or_horizon_are_rejected() {
    let h = harness(1).await;
    let edge = Window::new(
        chrono::DateTime::<chrono::Utc>::MAX_UTC - ChronoDuration::minutes(30),
        60,
    );

    let err = h
        .allocator
        .find_available_licenses(&edge, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    let err = h.allocator.pool_usage(&edge).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    let err = h
        .allocator
        .schedule(request(LessonId::new(), edge.start_time, 60))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let beyond_horizon = at(10, 0) + ChronoDuration::days(731);
    let err = h
        .allocator
        .schedule(request(LessonId::new(), beyond_horizon, 60))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let within_horizon = at(10, 0) + ChronoDuration::days(700);
    h.allocator
        .schedule(request(LessonId::new(), within_horizon, 60))
        .await
        .unwrap();
    assert_eq!(h.provider.meeting_count(), 1);
}
