//! Application builder: wires router, middleware and state into an Axum app,
//! and assembles the allocator stack from configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::sync::broadcast::error::RecvError;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use livehub_core::config::{AppConfig, LedgerBackend};
use livehub_core::error::AppError;
use livehub_core::events::EventBus;
use livehub_database::DatabasePool;
use livehub_database::migration::run_migrations;
use livehub_provider::build_provider;
use livehub_scheduler::{BookingLedger, LedgerDispatch, LicenseAllocator};

use crate::middleware::compression::build_compression_layer;
use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(build_compression_layer())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Create the allocator over `ledger` with the configured meeting provider.
pub fn build_allocator(
    config: &AppConfig,
    ledger: Arc<dyn BookingLedger>,
) -> Result<LicenseAllocator, AppError> {
    let provider = build_provider(&config.provider)?;
    Ok(LicenseAllocator::new(
        ledger,
        provider,
        config.scheduling.clone(),
        Duration::from_secs(config.provider.timeout_seconds),
    ))
}

/// Connect the configured ledger backend and assemble the application state.
pub async fn build_state(config: AppConfig) -> Result<AppState, AppError> {
    let database = match config.scheduling.ledger {
        LedgerBackend::Postgres => {
            let database = DatabasePool::connect(&config.database).await?;
            run_migrations(database.pool()).await?;
            Some(database)
        }
        LedgerBackend::Memory => {
            warn!("Using the in-memory ledger; bookings are lost on restart");
            None
        }
    };

    let ledger = LedgerDispatch::from_config(
        config.scheduling.ledger,
        database.as_ref().map(|d| d.pool().clone()),
    )?;
    info!(ledger = ledger.backend_name(), "Booking ledger initialized");

    let allocator = build_allocator(&config, Arc::new(ledger))?;
    spawn_event_logger(allocator.events());

    Ok(AppState::new(config, allocator, database))
}

/// Build the state from configuration and serve until shutdown.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting LiveHub server...");
    let state = build_state(config).await?;
    let database = state.database.clone();

    let result = serve(state).await;

    if let Some(database) = database {
        database.close().await;
    }
    result
}

/// Bind the configured address and serve until Ctrl+C.
pub async fn serve(state: AppState) -> Result<(), AppError> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(address = %addr, "LiveHub server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    info!("LiveHub server stopped");
    Ok(())
}

/// Log every meeting lifecycle event until the bus closes.
fn spawn_event_logger(events: &EventBus) {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => debug!(
                    event_id = %event.id,
                    payload = ?event.payload,
                    "Meeting event"
                ),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event logger lagged behind")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
