//! Lesson meeting handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use livehub_core::types::id::{BookingId, LessonId};
use livehub_scheduler::{BookingResult, ScheduleRequest};

use crate::dto::request::{ListMeetingsQuery, ScheduleMeetingRequest, validate_request};
use crate::dto::response::{ApiResponse, MeetingResponse, MessageResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/lessons/{lesson_id}/meeting
///
/// Schedules the lesson's meeting, or moves it when one already exists.
pub async fn schedule_lesson_meeting(
    State(state): State<AppState>,
    Path(lesson_id): Path<LessonId>,
    Json(req): Json<ScheduleMeetingRequest>,
) -> Result<Json<ApiResponse<BookingResult>>, ApiError> {
    validate_request(&req)?;
    let window = req.window();
    let result = state
        .allocator
        .schedule(ScheduleRequest {
            lesson_id,
            topic: req.topic,
            window,
        })
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// GET /api/lessons/{lesson_id}/meeting
pub async fn get_lesson_meeting(
    State(state): State<AppState>,
    Path(lesson_id): Path<LessonId>,
) -> Result<Json<ApiResponse<MeetingResponse>>, ApiError> {
    let booking = state.allocator.booking_for_lesson(lesson_id).await?;
    Ok(Json(ApiResponse::ok(booking.into())))
}

/// DELETE /api/lessons/{lesson_id}/meeting
pub async fn unschedule_lesson_meeting(
    State(state): State<AppState>,
    Path(lesson_id): Path<LessonId>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.allocator.unschedule_lesson(lesson_id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Meeting unscheduled",
    ))))
}

/// GET /api/meetings?from=&to=
pub async fn list_meetings(
    State(state): State<AppState>,
    Query(query): Query<ListMeetingsQuery>,
) -> Result<Json<ApiResponse<Vec<MeetingResponse>>>, ApiError> {
    let bookings = state.allocator.list_bookings(query.from, query.to).await?;
    Ok(Json(ApiResponse::ok(
        bookings.into_iter().map(MeetingResponse::from).collect(),
    )))
}

/// GET /api/meetings/{id}
pub async fn get_meeting(
    State(state): State<AppState>,
    Path(id): Path<BookingId>,
) -> Result<Json<ApiResponse<MeetingResponse>>, ApiError> {
    let booking = state.allocator.get_booking(id).await?;
    Ok(Json(ApiResponse::ok(booking.into())))
}

/// DELETE /api/meetings/{id}
pub async fn delete_meeting(
    State(state): State<AppState>,
    Path(id): Path<BookingId>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.allocator.unschedule(id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Meeting unscheduled",
    ))))
}
