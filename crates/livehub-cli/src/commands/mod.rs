//! CLI command definitions and dispatch.

pub mod availability;
pub mod license;
pub mod meeting;
pub mod migrate;
pub mod serve;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use livehub_core::config::AppConfig;
use livehub_core::error::AppError;
use livehub_database::DatabasePool;
use livehub_scheduler::{LicenseAllocator, PgLedger};

/// LiveHub: live-class meeting license allocation
#[derive(Debug, Parser)]
#[command(name = "livehub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay (`config/{env}.toml`)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the LiveHub server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// License pool management
    License(license::LicenseArgs),
    /// Scheduled meeting inspection
    Meeting(meeting::MeetingArgs),
    /// Check which licenses are free for a window
    Availability(availability::AvailabilityArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.config, &self.env)?;
        match &self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::License(args) => license::execute(args, &config, self.format).await,
            Commands::Meeting(args) => meeting::execute(args, &config, self.format).await,
            Commands::Availability(args) => {
                availability::execute(args, &config, self.format).await
            }
        }
    }
}

/// Helper: build an allocator over the Postgres ledger.
///
/// Administrative commands always act on the shared database, whatever
/// ledger the server is configured with.
pub async fn connect_allocator(
    config: &AppConfig,
) -> Result<(LicenseAllocator, DatabasePool), AppError> {
    let database = DatabasePool::connect(&config.database).await?;
    let ledger = Arc::new(PgLedger::new(database.pool().clone()));
    let allocator = livehub_api::build_allocator(config, ledger)?;
    Ok((allocator, database))
}

/// Helper: ask for confirmation unless `force` is set.
pub fn confirm(prompt: &str, force: bool) -> Result<bool, AppError> {
    if force {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}
