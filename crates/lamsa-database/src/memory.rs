//! In-memory store implementations.
//!
//! Backs tests and standalone runs that have no PostgreSQL available.
//! Mirrors the semantics documented on [`crate::store::DeliveryStore`]:
//! one row per (notification, channel) and atomic attempt counting.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use lamsa_core::error::AppError;
use lamsa_core::result::AppResult;
use lamsa_entity::notification::{
    Channel, DeliveryRecord, DeliveryState, DeliveryStats, Recipient,
};

use crate::store::{DeliveryStore, NewDelivery, RecipientDirectory};

/// In-memory [`DeliveryStore`].
#[derive(Debug, Default)]
pub struct MemoryDeliveryStore {
    rows: DashMap<Uuid, DeliveryRecord>,
    // (notification_id, channel) -> row id, enforcing the uniqueness the
    // Postgres backend gets from its unique constraint.
    index: DashMap<(Uuid, Channel), Uuid>,
}

impl MemoryDeliveryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch one row by id. Test helper.
    pub fn get(&self, delivery_id: Uuid) -> Option<DeliveryRecord> {
        self.rows.get(&delivery_id).map(|r| r.clone())
    }
}

#[async_trait]
impl DeliveryStore for MemoryDeliveryStore {
    async fn track(&self, new: NewDelivery) -> AppResult<DeliveryRecord> {
        let now = Utc::now();
        // Holding the index entry guard makes the upsert atomic with
        // respect to concurrent track() calls for the same pair.
        let entry = self.index.entry((new.notification_id, new.channel));
        let record = match entry {
            dashmap::mapref::entry::Entry::Occupied(existing) => {
                let id = *existing.get();
                let mut row = self
                    .rows
                    .get_mut(&id)
                    .ok_or_else(|| AppError::internal("Delivery index points at missing row"))?;
                row.status = new.status;
                row.attempts += new.attempts;
                row.failure_reason = new.failure_reason;
                if new.external_id.is_some() {
                    row.external_id = new.external_id;
                }
                if new.last_attempt_at.is_some() {
                    row.last_attempt_at = new.last_attempt_at;
                }
                row.updated_at = now;
                row.clone()
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let record = DeliveryRecord {
                    id: Uuid::new_v4(),
                    notification_id: new.notification_id,
                    channel: new.channel,
                    event: new.event,
                    priority: new.priority,
                    status: new.status,
                    attempts: new.attempts,
                    recipient_id: new.recipient_id,
                    title: new.title,
                    body: new.body,
                    last_attempt_at: new.last_attempt_at,
                    delivered_at: None,
                    failure_reason: new.failure_reason,
                    external_id: new.external_id,
                    created_at: now,
                    updated_at: now,
                };
                self.rows.insert(record.id, record.clone());
                slot.insert(record.id);
                record
            }
        };
        Ok(record)
    }

    async fn update_status(
        &self,
        delivery_id: Uuid,
        status: DeliveryState,
        failure_reason: Option<&str>,
        external_id: Option<&str>,
    ) -> AppResult<()> {
        let mut row = self.rows.get_mut(&delivery_id).ok_or_else(|| {
            AppError::not_found(format!("Delivery record {delivery_id} not found"))
        })?;

        let now = Utc::now();
        row.status = status;
        match status {
            DeliveryState::Sent | DeliveryState::Failed => {
                row.attempts += 1;
                row.last_attempt_at = Some(now);
                row.failure_reason = failure_reason.map(str::to_owned);
                if let Some(id) = external_id {
                    row.external_id = Some(id.to_owned());
                }
            }
            DeliveryState::Delivered => {
                row.delivered_at = Some(now);
            }
            DeliveryState::Pending | DeliveryState::Expired => {}
        }
        row.updated_at = now;
        Ok(())
    }

    async fn find_by_notification(&self, notification_id: Uuid) -> AppResult<Vec<DeliveryRecord>> {
        let mut rows: Vec<DeliveryRecord> = self
            .rows
            .iter()
            .filter(|r| r.notification_id == notification_id)
            .map(|r| r.clone())
            .collect();
        rows.sort_by_key(|r| r.created_at);
        Ok(rows)
    }

    async fn stats(&self, notification_id: Uuid) -> AppResult<DeliveryStats> {
        let mut stats = DeliveryStats::default();
        for row in self.rows.iter() {
            if row.notification_id == notification_id {
                stats.record(row.status);
            }
        }
        Ok(stats)
    }

    async fn find_retryable(
        &self,
        max_attempts: i32,
        limit: i64,
    ) -> AppResult<Vec<DeliveryRecord>> {
        let mut rows: Vec<DeliveryRecord> = self
            .rows
            .iter()
            .filter(|r| r.status == DeliveryState::Failed && r.attempts < max_attempts)
            .map(|r| r.clone())
            .collect();
        rows.sort_by_key(|r| r.last_attempt_at);
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn mark_expired(&self, max_age: Duration) -> AppResult<u64> {
        let cutoff = Utc::now() - max_age;
        let mut affected = 0u64;
        for mut row in self.rows.iter_mut() {
            if row.status == DeliveryState::Pending && row.created_at < cutoff {
                row.status = DeliveryState::Expired;
                row.updated_at = Utc::now();
                affected += 1;
            }
        }
        Ok(affected)
    }
}

/// In-memory [`RecipientDirectory`] seeded up front.
#[derive(Debug, Default)]
pub struct StaticRecipientDirectory {
    recipients: DashMap<Uuid, Recipient>,
}

impl StaticRecipientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, recipient: Recipient) {
        self.recipients.insert(recipient.id, recipient);
    }
}

#[async_trait]
impl RecipientDirectory for StaticRecipientDirectory {
    async fn find(&self, recipient_id: Uuid) -> AppResult<Option<Recipient>> {
        Ok(self.recipients.get(&recipient_id).map(|r| r.clone()))
    }

    async fn upsert_preferences(
        &self,
        recipient_id: Uuid,
        preferences: &serde_json::Value,
    ) -> AppResult<()> {
        let mut recipient = self.recipients.get_mut(&recipient_id).ok_or_else(|| {
            AppError::not_found(format!("Recipient {recipient_id} not found"))
        })?;
        recipient.preferences = serde_json::from_value(preferences.clone()).ok();
        Ok(())
    }
}
