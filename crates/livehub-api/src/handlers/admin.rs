//! License pool administration handlers.

use axum::Json;
use axum::extract::{Path, State};

use livehub_core::types::id::LicenseId;
use livehub_entity::license::{CreateLicense, License};

use crate::dto::request::{CreateLicenseRequest, SetLicenseActiveRequest, validate_request};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/admin/licenses
pub async fn list_licenses(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<License>>>, ApiError> {
    let licenses = state.allocator.list_licenses().await?;
    Ok(Json(ApiResponse::ok(licenses)))
}

/// POST /api/admin/licenses
pub async fn create_license(
    State(state): State<AppState>,
    Json(req): Json<CreateLicenseRequest>,
) -> Result<Json<ApiResponse<License>>, ApiError> {
    validate_request(&req)?;
    let license = state
        .allocator
        .create_license(CreateLicense {
            email: req.email,
            host_id: req.host_id,
            capacity: req.capacity,
        })
        .await?;
    Ok(Json(ApiResponse::ok(license)))
}

/// PUT /api/admin/licenses/{id}/active
pub async fn set_license_active(
    State(state): State<AppState>,
    Path(id): Path<LicenseId>,
    Json(req): Json<SetLicenseActiveRequest>,
) -> Result<Json<ApiResponse<License>>, ApiError> {
    let license = state.allocator.set_license_active(id, req.active).await?;
    Ok(Json(ApiResponse::ok(license)))
}
