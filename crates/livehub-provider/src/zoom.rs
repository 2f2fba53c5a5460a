//! Zoom-style REST adapter.
//!
//! Meetings are created with `POST {base_url}/users/{owner}/meetings` and
//! removed with `DELETE {base_url}/meetings/{number}`. Path segments are
//! percent-encoded. Authentication is a static bearer token; obtaining and
//! refreshing it happens elsewhere.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use livehub_core::config::ProviderConfig;
use livehub_core::error::{AppError, ErrorKind};
use livehub_core::result::AppResult;
use livehub_core::traits::{CreateMeetingRequest, MeetingProvider, RemoteMeeting};

/// Zoom meeting type for a scheduled (non-recurring) meeting.
const SCHEDULED_MEETING: u8 = 2;

/// HTTP client for a Zoom-compatible meeting API.
#[derive(Debug, Clone)]
pub struct ZoomProvider {
    client: Client,
    base_url: Url,
    access_token: String,
}

#[derive(Debug, Serialize)]
struct CreateMeetingBody<'a> {
    topic: &'a str,
    #[serde(rename = "type")]
    meeting_type: u8,
    start_time: String,
    duration: u32,
    timezone: &'static str,
}

#[derive(Debug, Deserialize)]
struct CreateMeetingResponse {
    id: i64,
    #[serde(default)]
    password: String,
}

impl ZoomProvider {
    /// Build the adapter. Fails when no access token is configured or the
    /// base URL cannot take path segments.
    pub fn new(config: &ProviderConfig) -> AppResult<Self> {
        if config.access_token.is_empty() {
            return Err(AppError::configuration(
                "provider.access_token must be set for the zoom provider",
            ));
        }

        let base_url = Url::parse(&config.base_url).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("provider.base_url is not a valid URL: {}", config.base_url),
                e,
            )
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::configuration(format!(
                "provider.base_url cannot carry a path: {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build provider HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            client,
            base_url,
            access_token: config.access_token.clone(),
        })
    }

    /// `base_url` extended by `segments`, each percent-encoded on its own.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AppError::configuration("provider.base_url cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn create_url(&self, owner: &str) -> AppResult<Url> {
        self.endpoint(["users", owner, "meetings"])
    }

    fn delete_url(&self, meeting_number: i64) -> AppResult<Url> {
        let number = meeting_number.to_string();
        self.endpoint(["meetings", number.as_str()])
    }
}

#[async_trait]
impl MeetingProvider for ZoomProvider {
    fn name(&self) -> &'static str {
        "zoom"
    }

    async fn create_meeting(&self, request: &CreateMeetingRequest) -> AppResult<RemoteMeeting> {
        if let Some(previous) = request.previous_meeting_number {
            debug!(previous_meeting = previous, "Creating replacement meeting");
        }

        let body = CreateMeetingBody {
            topic: &request.topic,
            meeting_type: SCHEDULED_MEETING,
            start_time: request
                .start_time
                .format("%Y-%m-%dT%H:%M:%SZ")
                .to_string(),
            duration: request.duration_minutes,
            timezone: "UTC",
        };

        let response = self
            .client
            .post(self.create_url(&request.owner_identity)?)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Meeting create request failed", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(status = %status, owner = %request.owner_identity, "Provider rejected meeting create");
            return Err(AppError::provider(format!(
                "Provider returned {status} creating meeting: {detail}"
            )));
        }

        let created: CreateMeetingResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Malformed meeting create response",
                e,
            )
        })?;

        info!(
            meeting_number = created.id,
            owner = %request.owner_identity,
            "Remote meeting created"
        );

        Ok(RemoteMeeting {
            meeting_number: created.id,
            passcode: created.password,
        })
    }

    async fn delete_meeting(&self, meeting_number: i64) -> AppResult<()> {
        let response = self
            .client
            .delete(self.delete_url(meeting_number)?)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Meeting delete request failed", e)
            })?;

        match response.status() {
            status if status.is_success() => {
                info!(meeting_number, "Remote meeting deleted");
                Ok(())
            }
            StatusCode::NOT_FOUND => {
                debug!(meeting_number, "Remote meeting already gone");
                Ok(())
            }
            status => Err(AppError::provider(format!(
                "Provider returned {status} deleting meeting {meeting_number}"
            ))),
        }
    }
}
