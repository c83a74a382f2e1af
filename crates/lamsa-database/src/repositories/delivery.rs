//! Delivery-tracking repository backed by PostgreSQL.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use lamsa_core::error::{AppError, ErrorKind};
use lamsa_core::result::AppResult;
use lamsa_entity::notification::{DeliveryRecord, DeliveryState, DeliveryStats};

use crate::store::{DeliveryStore, NewDelivery};

/// [`DeliveryStore`] implementation over the `delivery_status` table.
#[derive(Debug, Clone)]
pub struct DeliveryRepository {
    pool: PgPool,
}

impl DeliveryRepository {
    /// Create a new delivery repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeliveryStore for DeliveryRepository {
    async fn track(&self, new: NewDelivery) -> AppResult<DeliveryRecord> {
        // Upsert on (notification_id, channel): a replayed dispatch for the
        // same notification must not create a duplicate row.
        sqlx::query_as::<_, DeliveryRecord>(
            "INSERT INTO delivery_status \
               (id, notification_id, channel, event, priority, status, attempts, recipient_id, \
                title, body, failure_reason, external_id, last_attempt_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW(), NOW()) \
             ON CONFLICT (notification_id, channel) DO UPDATE SET \
               status = EXCLUDED.status, \
               attempts = delivery_status.attempts + EXCLUDED.attempts, \
               failure_reason = EXCLUDED.failure_reason, \
               external_id = COALESCE(EXCLUDED.external_id, delivery_status.external_id), \
               last_attempt_at = COALESCE(EXCLUDED.last_attempt_at, delivery_status.last_attempt_at), \
               updated_at = NOW() \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(new.notification_id)
        .bind(new.channel)
        .bind(new.event)
        .bind(new.priority)
        .bind(new.status)
        .bind(new.attempts)
        .bind(new.recipient_id)
        .bind(&new.title)
        .bind(&new.body)
        .bind(&new.failure_reason)
        .bind(&new.external_id)
        .bind(new.last_attempt_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to track delivery", e))
    }

    async fn update_status(
        &self,
        delivery_id: Uuid,
        status: DeliveryState,
        failure_reason: Option<&str>,
        external_id: Option<&str>,
    ) -> AppResult<()> {
        // The attempts increment happens inside the UPDATE so concurrent
        // writers cannot lose it to a read-modify-write race.
        let result = match status {
            DeliveryState::Sent | DeliveryState::Failed => {
                sqlx::query(
                    "UPDATE delivery_status SET \
                       status = $2, \
                       attempts = attempts + 1, \
                       failure_reason = $3, \
                       external_id = COALESCE($4, external_id), \
                       last_attempt_at = NOW(), \
                       updated_at = NOW() \
                     WHERE id = $1",
                )
                .bind(delivery_id)
                .bind(status)
                .bind(failure_reason)
                .bind(external_id)
                .execute(&self.pool)
                .await
            }
            DeliveryState::Delivered => {
                sqlx::query(
                    "UPDATE delivery_status SET \
                       status = $2, \
                       delivered_at = NOW(), \
                       updated_at = NOW() \
                     WHERE id = $1",
                )
                .bind(delivery_id)
                .bind(status)
                .execute(&self.pool)
                .await
            }
            DeliveryState::Pending | DeliveryState::Expired => {
                sqlx::query(
                    "UPDATE delivery_status SET status = $2, updated_at = NOW() WHERE id = $1",
                )
                .bind(delivery_id)
                .bind(status)
                .execute(&self.pool)
                .await
            }
        };

        let result = result.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update delivery status", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Delivery record {delivery_id} not found"
            )));
        }
        Ok(())
    }

    async fn find_by_notification(&self, notification_id: Uuid) -> AppResult<Vec<DeliveryRecord>> {
        sqlx::query_as::<_, DeliveryRecord>(
            "SELECT * FROM delivery_status WHERE notification_id = $1 ORDER BY created_at",
        )
        .bind(notification_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list deliveries", e))
    }

    async fn stats(&self, notification_id: Uuid) -> AppResult<DeliveryStats> {
        let rows: Vec<(DeliveryState, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM delivery_status WHERE notification_id = $1 GROUP BY status",
        )
        .bind(notification_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count deliveries", e))?;

        let mut stats = DeliveryStats::default();
        for (state, count) in rows {
            match state {
                DeliveryState::Pending => stats.pending = count,
                DeliveryState::Sent => stats.sent = count,
                DeliveryState::Delivered => stats.delivered = count,
                DeliveryState::Failed => stats.failed = count,
                DeliveryState::Expired => stats.expired = count,
            }
        }
        Ok(stats)
    }

    async fn find_retryable(
        &self,
        max_attempts: i32,
        limit: i64,
    ) -> AppResult<Vec<DeliveryRecord>> {
        sqlx::query_as::<_, DeliveryRecord>(
            "SELECT * FROM delivery_status \
             WHERE status = 'failed' AND attempts < $1 \
             ORDER BY last_attempt_at ASC NULLS FIRST \
             LIMIT $2",
        )
        .bind(max_attempts)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to query retryable rows", e)
        })
    }

    async fn mark_expired(&self, max_age: Duration) -> AppResult<u64> {
        let cutoff = Utc::now() - max_age;
        let result = sqlx::query(
            "UPDATE delivery_status SET status = 'expired', updated_at = NOW() \
             WHERE status = 'pending' AND created_at < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to expire pending rows", e)
        })?;

        Ok(result.rows_affected())
    }
}
