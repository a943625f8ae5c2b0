//! Configuration for the candles client.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`CandlesClient`](crate::client::CandlesClient).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Client instance ID (for logs)
    pub client_id: String,
    /// Hold-to-confirm duration in milliseconds
    pub hold_duration_ms: u64,
    /// Re-issue the session when it expires within this margin (seconds)
    pub session_margin_secs: u64,
    /// Whether rate-limit rejections are reported to the audit log
    pub report_rejections: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: uuid::Uuid::new_v4().to_string(),
            hold_duration_ms: 2500,
            session_margin_secs: 60,
            report_rejections: true,
        }
    }
}

impl ClientConfig {
    /// Create a config with a client ID.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Default::default()
        }
    }

    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// The hold-to-confirm duration.
    pub fn hold_duration(&self) -> Duration {
        Duration::from_millis(self.hold_duration_ms)
    }

    /// The session re-issuance margin.
    pub fn session_margin(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_margin_secs as i64)
    }
}
