//! External meeting provider configuration.

use serde::{Deserialize, Serialize};

/// Which meeting provider adapter to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Zoom-style REST API.
    Zoom,
    /// In-process mock (development and tests).
    #[default]
    Mock,
}

/// Meeting provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider adapter.
    #[serde(default)]
    pub kind: ProviderKind,
    /// Base URL of the provider REST API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token used for provider calls. Token refresh is handled
    /// outside this service.
    #[serde(default)]
    pub access_token: String,
    /// Upper bound for a single provider call in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            base_url: default_base_url(),
            access_token: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.zoom.us/v2".to_string()
}

fn default_timeout() -> u64 {
    15
}
