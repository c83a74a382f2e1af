//! Dispatch request model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::channel::Channel;
use super::event::NotificationEvent;
use super::priority::Priority;
use super::recipient::Recipient;

/// One unit of dispatch: a logical notification to one recipient.
///
/// Created by a calling subsystem (booking, payment, review) and consumed
/// exactly once by the dispatcher. The request itself is not persisted;
/// only the delivery records derived from it are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// The lifecycle event being announced.
    pub event: NotificationEvent,
    /// Delivery target snapshot.
    pub recipient: Recipient,
    /// Named substitution values for template rendering.
    #[serde(default)]
    pub data: serde_json::Value,
    /// Dispatch priority.
    #[serde(default)]
    pub priority: Priority,
    /// Ordered candidate channels.
    pub channels: Vec<Channel>,
    /// Earliest delivery time, if the caller wants a delayed send.
    ///
    /// Carried for callers that schedule ahead (booking reminders); the
    /// dispatcher does not defer on it yet and sends immediately.
    #[serde(default)]
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Time after which the notification is stale and must not be sent.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl NotificationRequest {
    /// Convenience constructor with default priority and empty data.
    pub fn new(event: NotificationEvent, recipient: Recipient, channels: Vec<Channel>) -> Self {
        Self {
            event,
            recipient,
            data: serde_json::Value::Object(serde_json::Map::new()),
            priority: Priority::Normal,
            channels,
            scheduled_for: None,
            expires_at: None,
        }
    }

    /// Set the substitution data.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Whether the request has passed its expiry time.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|e| e <= now).unwrap_or(false)
    }
}
