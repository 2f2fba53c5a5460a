//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use livehub_core::config::AppConfig;
use livehub_core::error::AppError;
use livehub_database::DatabasePool;
use livehub_database::migration::run_migrations;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    let database = DatabasePool::connect(&config.database).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            run_migrations(database.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
    }

    database.close().await;
    Ok(())
}
