//! Availability handlers.

use axum::Json;
use axum::extract::{Query, State};

use livehub_scheduler::PoolUsage;

use crate::dto::request::{WindowQuery, validate_request};
use crate::dto::response::{ApiResponse, AvailabilityResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/licenses/available?start_time=&duration_minutes=&exclude=
pub async fn available(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ApiResponse<AvailabilityResponse>>, ApiError> {
    validate_request(&query)?;
    let window = query.window();
    let license_ids = state
        .allocator
        .find_available_licenses(&window, query.exclude)
        .await?;
    Ok(Json(ApiResponse::ok(AvailabilityResponse {
        window,
        license_ids,
    })))
}

/// GET /api/licenses/usage?start_time=&duration_minutes=
pub async fn usage(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ApiResponse<PoolUsage>>, ApiError> {
    validate_request(&query)?;
    let usage = state.allocator.pool_usage(&query.window()).await?;
    Ok(Json(ApiResponse::ok(usage)))
}
