//! License pool management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use livehub_core::config::AppConfig;
use livehub_core::error::AppError;
use livehub_core::types::id::LicenseId;
use livehub_entity::license::{CreateLicense, License};

/// Arguments for license commands
#[derive(Debug, Args)]
pub struct LicenseArgs {
    /// License subcommand
    #[command(subcommand)]
    pub command: LicenseCommand,
}

/// License subcommands
#[derive(Debug, Subcommand)]
pub enum LicenseCommand {
    /// Register a new host account in the pool
    Add {
        /// Host account email
        email: String,
        /// Provider-side user ID, if different from the email
        #[arg(long)]
        host_id: Option<String>,
        /// Maximum participants per meeting
        #[arg(long, default_value_t = 100)]
        capacity: i32,
    },
    /// List every license in the pool
    List,
    /// Return a license to the pool
    Activate {
        /// License ID
        id: LicenseId,
    },
    /// Withdraw a license from future allocation
    Deactivate {
        /// License ID
        id: LicenseId,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
}

/// One license, flattened for table output.
#[derive(Debug, Serialize, Tabled)]
pub struct LicenseRow {
    /// License ID
    #[tabled(rename = "ID")]
    pub id: String,
    /// Host email
    #[tabled(rename = "Email")]
    pub email: String,
    /// Provider user ID
    #[tabled(rename = "Host ID")]
    pub host_id: String,
    /// Participant capacity
    #[tabled(rename = "Capacity")]
    pub capacity: i32,
    /// Whether the license is allocatable
    #[tabled(rename = "Active")]
    pub active: bool,
}

impl From<&License> for LicenseRow {
    fn from(license: &License) -> Self {
        Self {
            id: license.id.to_string(),
            email: license.email.clone(),
            host_id: license.host_id.clone().unwrap_or_else(|| "-".to_string()),
            capacity: license.capacity,
            active: license.is_active,
        }
    }
}

/// Execute license commands
pub async fn execute(
    args: &LicenseArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (allocator, database) = super::connect_allocator(config).await?;

    match &args.command {
        LicenseCommand::Add {
            email,
            host_id,
            capacity,
        } => {
            let license = allocator
                .create_license(CreateLicense {
                    email: email.clone(),
                    host_id: host_id.clone(),
                    capacity: *capacity,
                })
                .await?;
            output::print_success(&format!("License {} added for {}", license.id, license.email));
        }
        LicenseCommand::List => {
            let licenses = allocator.list_licenses().await?;
            let rows: Vec<LicenseRow> = licenses.iter().map(LicenseRow::from).collect();
            output::print_list(&rows, format);
        }
        LicenseCommand::Activate { id } => {
            let license = allocator.set_license_active(*id, true).await?;
            output::print_success(&format!("License {} ({}) activated", license.id, license.email));
        }
        LicenseCommand::Deactivate { id, force } => {
            let prompt = format!(
                "Deactivate license {id}? Existing bookings keep it, new ones will not get it."
            );
            if !super::confirm(&prompt, *force)? {
                println!("Cancelled.");
            } else {
                let license = allocator.set_license_active(*id, false).await?;
                output::print_success(&format!(
                    "License {} ({}) deactivated",
                    license.id, license.email
                ));
            }
        }
    }

    database.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_row_renders_missing_host_id() {
        let license = License {
            id: LicenseId::new(),
            email: "host@school.edu".to_string(),
            host_id: None,
            capacity: 300,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let row = LicenseRow::from(&license);
        assert_eq!(row.host_id, "-");
        assert_eq!(row.capacity, 300);
        assert_eq!(row.id, license.id.to_string());
    }
}
