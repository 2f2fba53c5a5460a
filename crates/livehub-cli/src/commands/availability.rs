//! License availability check for a prospective window.

use chrono::{DateTime, Utc};
use clap::Args;

use super::license::LicenseRow;
use crate::output::{self, OutputFormat};
use livehub_core::config::AppConfig;
use livehub_core::error::AppError;
use livehub_core::types::id::BookingId;
use livehub_core::types::window::Window;

/// Arguments for the availability command
#[derive(Debug, Args)]
pub struct AvailabilityArgs {
    /// Window start (RFC 3339)
    #[arg(long)]
    pub start: DateTime<Utc>,

    /// Window length in minutes
    #[arg(long)]
    pub duration: u32,

    /// Ignore this booking's own license hold (reschedule preview)
    #[arg(long)]
    pub exclude: Option<BookingId>,
}

/// Execute the availability command
pub async fn execute(
    args: &AvailabilityArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    if args.duration == 0 {
        return Err(AppError::validation("Duration must be at least one minute"));
    }

    let (allocator, database) = super::connect_allocator(config).await?;
    let window = Window::new(args.start, args.duration);

    // Validates the window before the resolver is queried directly.
    let usage = allocator.pool_usage(&window).await?;
    let free = allocator
        .resolver()
        .available_licenses(&window, args.exclude)
        .await?;
    database.close().await;

    match format {
        OutputFormat::Json => output::print_json(&usage),
        OutputFormat::Table => {
            println!(
                "Pool usage for {} (+{} min):",
                window.start_time.to_rfc3339(),
                window.duration_minutes
            );
            output::print_kv("Active Licenses", &usage.active_licenses.to_string());
            output::print_kv("Busy", &usage.busy_licenses.to_string());
            output::print_kv("Free", &usage.free_licenses.to_string());
        }
    }

    if free.is_empty() {
        output::print_warning("No license is free for this window");
    } else {
        let rows: Vec<LicenseRow> = free.iter().map(LicenseRow::from).collect();
        output::print_list(&rows, format);
    }
    Ok(())
}
