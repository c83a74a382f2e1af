//! Notification priority levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority of a dispatch request.
///
/// `Urgent` disables early-stop-on-success: every eligible channel is
/// attempted even after one succeeds, accepting duplicate delivery as
/// the cost of urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Background events.
    Low,
    /// Standard events (default).
    Normal,
    /// Important events.
    High,
    /// Requires immediate attention; attempts all channels.
    Urgent,
}

impl Priority {
    /// Whether every eligible channel must be attempted.
    pub fn attempts_all_channels(&self) -> bool {
        matches!(self, Self::Urgent)
    }

    /// Return the priority as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Normal
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
