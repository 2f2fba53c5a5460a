//! Route definitions for the LiveHub HTTP API.
//!
//! All routes are mounted under `/api`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, put},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes and the request logger.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(lesson_routes())
        .merge(meeting_routes())
        .merge(license_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Lesson meeting lifecycle
fn lesson_routes() -> Router<AppState> {
    Router::new().route(
        "/lessons/{lesson_id}/meeting",
        get(handlers::meetings::get_lesson_meeting)
            .post(handlers::meetings::schedule_lesson_meeting)
            .delete(handlers::meetings::unschedule_lesson_meeting),
    )
}

/// Booking lookups by ID and range
fn meeting_routes() -> Router<AppState> {
    Router::new()
        .route("/meetings", get(handlers::meetings::list_meetings))
        .route(
            "/meetings/{id}",
            get(handlers::meetings::get_meeting).delete(handlers::meetings::delete_meeting),
        )
}

/// Availability and pool usage
fn license_routes() -> Router<AppState> {
    Router::new()
        .route("/licenses/available", get(handlers::licenses::available))
        .route("/licenses/usage", get(handlers::licenses::usage))
}

/// License pool administration
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/licenses",
            get(handlers::admin::list_licenses).post(handlers::admin::create_license),
        )
        .route(
            "/admin/licenses/{id}/active",
            put(handlers::admin::set_license_active),
        )
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
