//! Real-time WebSocket configuration.

use serde::{Deserialize, Serialize};

/// Real-time connection registry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound message buffer size per connection.
    #[serde(default = "default_buffer")]
    pub channel_buffer_size: usize,
    /// Maximum simultaneous connections per recipient.
    #[serde(default = "default_max_per_user")]
    pub max_connections_per_user: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_buffer(),
            max_connections_per_user: default_max_per_user(),
        }
    }
}

fn default_buffer() -> usize {
    64
}

fn default_max_per_user() -> usize {
    5
}
