//! SMS channel configuration.

use serde::{Deserialize, Serialize};

/// SMS channel settings.
///
/// `providers` is the ordered fallback chain; the first entry is the
/// primary gateway. Adding a provider is a list insertion, not a code
/// change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    /// Gateway names in fallback order (primary first).
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,
    /// Sender id shown to the recipient.
    #[serde(default = "default_sender_id")]
    pub sender_id: String,
    /// Per-gateway call timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            sender_id: default_sender_id(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_providers() -> Vec<String> {
    vec!["mock-primary".to_string(), "mock-fallback".to_string()]
}

fn default_sender_id() -> String {
    "Lamsa".to_string()
}

fn default_timeout() -> u64 {
    10
}
