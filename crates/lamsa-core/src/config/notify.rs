//! Notification dispatch configuration.

use serde::{Deserialize, Serialize};

/// Dispatcher-level notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Whether recipient quiet hours are enforced at dispatch time.
    #[serde(default = "default_true")]
    pub quiet_hours_enforced: bool,
    /// Offset from UTC, in minutes, of the market's local time.
    ///
    /// Quiet-hours windows are expressed in the recipient's local wall
    /// clock; Jordan does not observe DST, so a fixed offset is enough.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
    /// Age in hours after which a `pending` delivery is marked `expired`.
    #[serde(default = "default_pending_expiry")]
    pub pending_expiry_hours: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            quiet_hours_enforced: true,
            utc_offset_minutes: default_utc_offset(),
            pending_expiry_hours: default_pending_expiry(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_utc_offset() -> i32 {
    // Jordan, UTC+3
    180
}

fn default_pending_expiry() -> u64 {
    24
}
