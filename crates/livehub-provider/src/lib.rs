//! # livehub-provider
//!
//! Adapters for the third-party platform that hosts the actual meeting
//! rooms. [`ZoomProvider`] talks to a Zoom-style REST API;
//! [`MockMeetingProvider`] keeps meetings in memory and supports failure
//! injection for development and tests.

pub mod mock;
pub mod zoom;

use std::sync::Arc;

use livehub_core::config::{ProviderConfig, ProviderKind};
use livehub_core::result::AppResult;
use livehub_core::traits::MeetingProvider;

pub use mock::MockMeetingProvider;
pub use zoom::ZoomProvider;

/// Build the provider adapter selected by configuration.
pub fn build_provider(config: &ProviderConfig) -> AppResult<Arc<dyn MeetingProvider>> {
    let provider: Arc<dyn MeetingProvider> = match config.kind {
        ProviderKind::Zoom => Arc::new(ZoomProvider::new(config)?),
        ProviderKind::Mock => Arc::new(MockMeetingProvider::new()),
    };
    tracing::info!(provider = provider.name(), "Meeting provider initialized");
    Ok(provider)
}
