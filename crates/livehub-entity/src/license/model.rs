//! Meeting license entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use livehub_core::types::id::LicenseId;

/// A third-party meeting license that can host one meeting at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct License {
    /// Unique license identifier.
    pub id: LicenseId,
    /// Host account e-mail on the provider.
    pub email: String,
    /// Provider-side user id, when known.
    pub host_id: Option<String>,
    /// Participant ceiling of the account. Unrelated to how many meetings
    /// the license may host concurrently (always one).
    pub capacity: i32,
    /// Inactive licenses are never offered for new bookings.
    pub is_active: bool,
    /// When the license was registered.
    pub created_at: DateTime<Utc>,
    /// Last modification.
    pub updated_at: DateTime<Utc>,
}

impl License {
    /// Identity under which the provider creates meetings for this license.
    pub fn owner_identity(&self) -> &str {
        self.host_id.as_deref().unwrap_or(&self.email)
    }
}

/// Data for registering a license.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLicense {
    /// Host account e-mail.
    pub email: String,
    /// Provider-side user id.
    pub host_id: Option<String>,
    /// Participant ceiling.
    pub capacity: i32,
}
