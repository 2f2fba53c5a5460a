//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use livehub_core::config::AppConfig;
use livehub_database::DatabasePool;
use livehub_scheduler::LicenseAllocator;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// License allocator (scheduling, availability, license admin)
    pub allocator: Arc<LicenseAllocator>,
    /// Database pool, absent when running on the in-memory ledger
    pub database: Option<DatabasePool>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Assemble the state.
    pub fn new(
        config: AppConfig,
        allocator: LicenseAllocator,
        database: Option<DatabasePool>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            allocator: Arc::new(allocator),
            database,
            started_at: Instant::now(),
        }
    }
}
