//! In-memory meeting provider for development and testing.
//!
//! Meeting numbers are handed out sequentially. Create and delete failures
//! can be switched on to exercise the allocator's error paths.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use livehub_core::error::AppError;
use livehub_core::result::AppResult;
use livehub_core::traits::{CreateMeetingRequest, MeetingProvider, RemoteMeeting};

/// First meeting number handed out by the mock.
const FIRST_MEETING_NUMBER: i64 = 80_000_000_000;

/// Mock provider that keeps meetings in memory.
#[derive(Debug)]
pub struct MockMeetingProvider {
    next_number: AtomicI64,
    /// Live meetings: meeting number -> create request
    meetings: Mutex<HashMap<i64, CreateMeetingRequest>>,
    /// Every create request received, in order
    create_log: Mutex<Vec<CreateMeetingRequest>>,
    /// Every delete received, in order
    delete_log: Mutex<Vec<i64>>,
    fail_create: AtomicBool,
    fail_delete: AtomicBool,
    create_delay: Mutex<Option<Duration>>,
}

impl Default for MockMeetingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMeetingProvider {
    /// Create an empty mock provider.
    pub fn new() -> Self {
        Self {
            next_number: AtomicI64::new(FIRST_MEETING_NUMBER),
            meetings: Mutex::new(HashMap::new()),
            create_log: Mutex::new(Vec::new()),
            delete_log: Mutex::new(Vec::new()),
            fail_create: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            create_delay: Mutex::new(None),
        }
    }

    /// Make subsequent creates fail.
    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent deletes fail.
    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Sleep this long inside every create (timeouts, cancellation).
    pub fn set_create_delay(&self, delay: Option<Duration>) {
        *self.create_delay.lock().unwrap_or_else(|e| e.into_inner()) = delay;
    }

    /// Whether a meeting with this number currently exists.
    pub fn has_meeting(&self, meeting_number: i64) -> bool {
        self.meetings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&meeting_number)
    }

    /// Number of live meetings.
    pub fn meeting_count(&self) -> usize {
        self.meetings.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// All create requests received so far.
    pub fn create_requests(&self) -> Vec<CreateMeetingRequest> {
        self.create_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// All meeting numbers a delete was requested for.
    pub fn delete_requests(&self) -> Vec<i64> {
        self.delete_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl MeetingProvider for MockMeetingProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_meeting(&self, request: &CreateMeetingRequest) -> AppResult<RemoteMeeting> {
        self.create_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let delay = *self.create_delay.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_create.load(Ordering::SeqCst) {
            tracing::warn!(owner = %request.owner_identity, "[MockProvider] Create failed (injected)");
            return Err(AppError::provider("mock provider create failure"));
        }

        let meeting_number = self.next_number.fetch_add(1, Ordering::SeqCst);
        let passcode = format!("{:06}", meeting_number % 1_000_000);
        self.meetings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(meeting_number, request.clone());

        tracing::debug!(
            meeting_number,
            owner = %request.owner_identity,
            "[MockProvider] Meeting created"
        );

        Ok(RemoteMeeting {
            meeting_number,
            passcode,
        })
    }

    async fn delete_meeting(&self, meeting_number: i64) -> AppResult<()> {
        self.delete_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(meeting_number);

        if self.fail_delete.load(Ordering::SeqCst) {
            tracing::warn!(meeting_number, "[MockProvider] Delete failed (injected)");
            return Err(AppError::provider("mock provider delete failure"));
        }

        self.meetings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&meeting_number);
        Ok(())
    }
}
