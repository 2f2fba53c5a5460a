//! External meeting provider adapter trait.
//!
//! The provider hosts the actual video meeting room. LiveHub picks a
//! license locally and then asks the provider to create the room under the
//! license's host identity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Parameters for creating a remote meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMeetingRequest {
    /// Meeting title shown to participants.
    pub topic: String,
    /// Scheduled start (UTC).
    pub start_time: DateTime<Utc>,
    /// Scheduled length in minutes.
    pub duration_minutes: u32,
    /// Host identity of the chosen license (e-mail or provider user id).
    pub owner_identity: String,
    /// Remote meeting this one replaces, when rescheduling.
    pub previous_meeting_number: Option<i64>,
}

/// A meeting room created on the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMeeting {
    /// Provider meeting number participants join with.
    pub meeting_number: i64,
    /// Join passcode.
    pub passcode: String,
}

/// Creates and tears down meeting rooms on the third-party platform.
///
/// Implementations perform network I/O; callers bound every call with a
/// timeout.
#[async_trait]
pub trait MeetingProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Create a meeting room.
    async fn create_meeting(&self, request: &CreateMeetingRequest) -> AppResult<RemoteMeeting>;

    /// Delete a meeting room. Deleting an unknown meeting is not an error.
    async fn delete_meeting(&self, meeting_number: i64) -> AppResult<()>;
}
