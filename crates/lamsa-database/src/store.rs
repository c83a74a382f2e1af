//! Storage trait seams for the dispatcher and retry scheduler.
//!
//! The dispatcher and scheduler depend only on these traits, never on a
//! concrete backend. Production wires the sqlx implementations from
//! [`crate::repositories`]; tests and standalone runs use
//! [`crate::memory`].

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use lamsa_core::result::AppResult;
use lamsa_entity::notification::{
    Channel, DeliveryRecord, DeliveryState, DeliveryStats, NotificationEvent, Priority, Recipient,
};

/// Parameters for creating one delivery-tracking row.
#[derive(Debug, Clone)]
pub struct NewDelivery {
    /// Logical notification id the row belongs to.
    pub notification_id: Uuid,
    /// Channel attempted.
    pub channel: Channel,
    /// Originating event.
    pub event: NotificationEvent,
    /// Priority of the originating request.
    pub priority: Priority,
    /// Recipient account, for retry-time rehydration.
    pub recipient_id: Uuid,
    /// Initial status: `pending` when parked, otherwise the outcome of
    /// the first attempt.
    pub status: DeliveryState,
    /// Attempts already made (0 for parked rows, 1 after a first attempt).
    pub attempts: i32,
    /// Rendered title.
    pub title: String,
    /// Rendered body.
    pub body: String,
    /// Failure reason when the first attempt failed.
    pub failure_reason: Option<String>,
    /// Vendor message id when the first attempt succeeded.
    pub external_id: Option<String>,
    /// When the first attempt was made, if one was.
    pub last_attempt_at: Option<DateTime<Utc>>,
}

/// Persistence for per-(notification, channel) delivery records.
///
/// Implementations must guarantee at most one row per
/// (notification_id, channel) pair and must increment `attempts`
/// atomically on status updates so that concurrent dispatcher and
/// scheduler writers never lose an increment.
#[async_trait]
pub trait DeliveryStore: Send + Sync + std::fmt::Debug {
    /// Create (or, on replay, overwrite) the row for one channel attempt.
    async fn track(&self, new: NewDelivery) -> AppResult<DeliveryRecord>;

    /// Record the outcome of a subsequent attempt.
    ///
    /// Transitions to `sent` or `failed` count as an attempt: `attempts`
    /// is incremented and `last_attempt_at` is set, in a single atomic
    /// statement. A transition to `delivered` sets `delivered_at` and
    /// does not touch the attempt counter.
    async fn update_status(
        &self,
        delivery_id: Uuid,
        status: DeliveryState,
        failure_reason: Option<&str>,
        external_id: Option<&str>,
    ) -> AppResult<()>;

    /// All rows for one notification, in creation order.
    async fn find_by_notification(&self, notification_id: Uuid) -> AppResult<Vec<DeliveryRecord>>;

    /// Counts by status for one notification.
    async fn stats(&self, notification_id: Uuid) -> AppResult<DeliveryStats>;

    /// Failed rows still under the attempt budget, oldest first.
    async fn find_retryable(&self, max_attempts: i32, limit: i64) -> AppResult<Vec<DeliveryRecord>>;

    /// Transition `pending` rows older than `max_age` to `expired`.
    /// Returns the number of rows affected.
    async fn mark_expired(&self, max_age: Duration) -> AppResult<u64>;
}

/// Account/identity collaborator supplying recipient addressing data.
///
/// The retry scheduler uses this to re-fetch phone numbers and device
/// tokens that are not embedded in the stored delivery payload.
#[async_trait]
pub trait RecipientDirectory: Send + Sync + std::fmt::Debug {
    /// Look up a recipient snapshot by account id.
    async fn find(&self, recipient_id: Uuid) -> AppResult<Option<Recipient>>;

    /// Replace a recipient's notification preferences.
    async fn upsert_preferences(
        &self,
        recipient_id: Uuid,
        preferences: &serde_json::Value,
    ) -> AppResult<()>;
}
