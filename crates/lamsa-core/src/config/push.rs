//! Push channel configuration.

use serde::{Deserialize, Serialize};

/// Push channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Per-gateway call timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Maximum messages per bulk send request.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_batch_size() -> usize {
    100
}
