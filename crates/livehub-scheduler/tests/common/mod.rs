#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use livehub_core::config::SchedulingConfig;
use livehub_core::traits::FixedClock;
use livehub_core::types::id::LessonId;
use livehub_core::types::window::Window;
use livehub_entity::license::{CreateLicense, License};
use livehub_provider::MockMeetingProvider;
use livehub_scheduler::{BookingLedger, LicenseAllocator, MemoryLedger, ScheduleRequest};

pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(15);

pub struct Harness {
    pub allocator: LicenseAllocator,
    pub ledger: Arc<MemoryLedger>,
    pub provider: Arc<MockMeetingProvider>,
    pub clock: Arc<FixedClock>,
    /// Registered licenses, lowest ID first.
    pub licenses: Vec<License>,
}

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, hour, minute, 0).unwrap()
}

pub fn request(lesson_id: LessonId, start: DateTime<Utc>, minutes: u32) -> ScheduleRequest {
    ScheduleRequest {
        lesson_id,
        topic: "Live class".to_string(),
        window: Window::new(start, minutes),
    }
}

pub async fn harness(license_count: usize) -> Harness {
    harness_with(license_count, SchedulingConfig::default()).await
}

pub async fn harness_with(license_count: usize, config: SchedulingConfig) -> Harness {
    let ledger = Arc::new(MemoryLedger::new());
    let provider = Arc::new(MockMeetingProvider::new());
    let clock = Arc::new(FixedClock::new(at(8, 0)));

    let mut licenses = Vec::with_capacity(license_count);
    for n in 0..license_count {
        let license = ledger
            .create_license(&CreateLicense {
                email: format!("host{n}@example.com"),
                host_id: None,
                capacity: 100,
            })
            .await
            .unwrap();
        licenses.push(license);
    }
    licenses.sort_by_key(|l| l.id);

    let allocator = LicenseAllocator::new(
        ledger.clone(),
        provider.clone(),
        config,
        PROVIDER_TIMEOUT,
    )
    .with_clock(clock.clone());

    Harness {
        allocator,
        ledger,
        provider,
        clock,
        licenses,
    }
}
