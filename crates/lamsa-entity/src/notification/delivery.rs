//! Delivery tracking records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

use super::channel::Channel;
use super::event::NotificationEvent;
use super::priority::Priority;

/// Status of one channel's delivery attempts for one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "delivery_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryState {
    /// Created but no attempt made yet (quiet-hours parking, scheduled).
    Pending,
    /// Handed to the channel gateway successfully.
    Sent,
    /// Delivery confirmed by an explicit channel-specific receipt.
    Delivered,
    /// Last attempt failed; may still be retried.
    Failed,
    /// Stale `pending` row aged out by the expiry sweep.
    Expired,
}

impl DeliveryState {
    /// Whether the retry scheduler may re-drive this row.
    pub fn can_retry(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Whether no further transitions are expected.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Expired)
    }

    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The persisted record of one channel's attempt(s) to deliver one
/// notification.
///
/// At most one record exists per (notification_id, channel); retries
/// mutate the row, they never create a second one. `attempts` only grows.
/// The rendered title/body are stored so the retry scheduler can resend
/// without re-rendering; addressing (phone, token) is re-fetched from the
/// account directory at retry time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeliveryRecord {
    /// Row identifier.
    pub id: Uuid,
    /// The logical notification this attempt belongs to.
    pub notification_id: Uuid,
    /// Channel attempted.
    pub channel: Channel,
    /// The event that produced this notification. Stored so a retry can
    /// rebuild its send context without the original request.
    pub event: NotificationEvent,
    /// Dispatch priority of the original request.
    pub priority: Priority,
    /// Current status.
    pub status: DeliveryState,
    /// Number of attempts made so far.
    pub attempts: i32,
    /// The recipient account, for retry-time rehydration.
    pub recipient_id: Uuid,
    /// Rendered title at dispatch time.
    pub title: String,
    /// Rendered body at dispatch time.
    pub body: String,
    /// When the most recent attempt was made.
    pub last_attempt_at: Option<DateTime<Utc>>,
    /// When a delivery receipt was recorded. Set iff status is `delivered`.
    pub delivered_at: Option<DateTime<Utc>>,
    /// Why the last attempt failed, if it did.
    pub failure_reason: Option<String>,
    /// Message id returned by the vendor gateway, if any.
    pub external_id: Option<String>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

/// Counts by status for one notification, for operational tooling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryStats {
    pub pending: i64,
    pub sent: i64,
    pub delivered: i64,
    pub failed: i64,
    pub expired: i64,
}

impl DeliveryStats {
    /// Total rows counted.
    pub fn total(&self) -> i64 {
        self.pending + self.sent + self.delivered + self.failed + self.expired
    }

    /// Add one row's status to the counts.
    pub fn record(&mut self, state: DeliveryState) {
        match state {
            DeliveryState::Pending => self.pending += 1,
            DeliveryState::Sent => self.sent += 1,
            DeliveryState::Delivered => self.delivered += 1,
            DeliveryState::Failed => self.failed += 1,
            DeliveryState::Expired => self.expired += 1,
        }
    }
}
