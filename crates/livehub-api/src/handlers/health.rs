//! Health check handler.

use axum::Json;
use axum::extract::State;

use livehub_core::config::LedgerBackend;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database = match &state.database {
        Some(pool) => Some(match pool.health_check().await {
            Ok(true) => "connected".to_string(),
            Ok(false) => "unreachable".to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                "unreachable".to_string()
            }
        }),
        None => None,
    };

    let status = match database.as_deref() {
        Some("unreachable") => "degraded",
        _ => "ok",
    };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        ledger: match state.config.scheduling.ledger {
            LedgerBackend::Postgres => "postgres",
            LedgerBackend::Memory => "memory",
        }
        .to_string(),
        database,
    }))
}
