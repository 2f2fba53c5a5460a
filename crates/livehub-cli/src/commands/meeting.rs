//! Scheduled meeting commands.

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use livehub_core::config::AppConfig;
use livehub_core::error::AppError;
use livehub_core::types::id::BookingId;
use livehub_entity::booking::Booking;

/// Arguments for meeting commands
#[derive(Debug, Args)]
pub struct MeetingArgs {
    /// Meeting subcommand
    #[command(subcommand)]
    pub command: MeetingCommand,
}

/// Meeting subcommands
#[derive(Debug, Subcommand)]
pub enum MeetingCommand {
    /// List meetings overlapping a time range
    List {
        /// Range start (RFC 3339)
        #[arg(long)]
        from: DateTime<Utc>,
        /// Range end (RFC 3339)
        #[arg(long)]
        to: DateTime<Utc>,
    },
    /// Cancel a meeting and free its license
    Cancel {
        /// Booking ID
        id: BookingId,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
}

/// One booking, flattened for table output.
#[derive(Debug, Serialize, Tabled)]
pub struct MeetingRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Topic")]
    pub topic: String,
    #[tabled(rename = "Start")]
    pub start_time: String,
    #[tabled(rename = "Minutes")]
    pub duration_minutes: u32,
    #[tabled(rename = "License")]
    pub license_id: String,
    #[tabled(rename = "Meeting")]
    pub meeting_number: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

impl From<&Booking> for MeetingRow {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id.to_string(),
            topic: booking.topic.clone(),
            start_time: booking.start_time.format("%Y-%m-%d %H:%M").to_string(),
            duration_minutes: booking.window().duration_minutes,
            license_id: booking
                .license_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            meeting_number: booking
                .meeting_number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
            status: booking.status.to_string(),
        }
    }
}

/// Execute meeting commands
pub async fn execute(
    args: &MeetingArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (allocator, database) = super::connect_allocator(config).await?;

    match &args.command {
        MeetingCommand::List { from, to } => {
            let bookings = allocator.list_bookings(*from, *to).await?;
            let rows: Vec<MeetingRow> = bookings.iter().map(MeetingRow::from).collect();
            output::print_list(&rows, format);
        }
        MeetingCommand::Cancel { id, force } => {
            let booking = allocator.get_booking(*id).await?;
            let prompt = format!(
                "Cancel '{}' at {}? The remote meeting will be deleted.",
                booking.topic,
                booking.start_time.to_rfc3339()
            );
            if !super::confirm(&prompt, *force)? {
                println!("Cancelled.");
            } else {
                allocator.unschedule(*id).await?;
                output::print_success(&format!("Meeting {id} cancelled"));
            }
        }
    }

    database.close().await;
    Ok(())
}
