//! Periodic retry of failed deliveries.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use lamsa_channels::{ChannelSender, SendContext};
use lamsa_core::config::RetryConfig;
use lamsa_core::result::AppResult;
use lamsa_database::store::{DeliveryStore, RecipientDirectory};
use lamsa_entity::notification::{Channel, DeliveryRecord, DeliveryState, RenderedMessage};

use crate::retry::RetryPolicy;

/// Counters for one scheduler tick, for logs and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct TickStats {
    /// Rows returned by the retryable query.
    pub scanned: usize,
    /// Rows actually re-attempted this tick.
    pub retried: usize,
    /// Re-attempts that were accepted by the channel.
    pub succeeded: usize,
    /// Re-attempts that failed again.
    pub failed: usize,
    /// Rows skipped or errored without an attempt (backoff not elapsed,
    /// recipient gone, storage error).
    pub skipped: usize,
}

/// Re-drives failed delivery rows on a fixed interval.
///
/// One row's failure never aborts the batch; errors are counted and the
/// loop continues. A tick that overruns the interval causes the next
/// tick to be skipped rather than piling up.
#[derive(Debug)]
pub struct RetryScheduler {
    store: Arc<dyn DeliveryStore>,
    directory: Arc<dyn RecipientDirectory>,
    senders: HashMap<Channel, Arc<dyn ChannelSender>>,
    policy: RetryPolicy,
    config: RetryConfig,
}

impl RetryScheduler {
    pub fn new(
        store: Arc<dyn DeliveryStore>,
        directory: Arc<dyn RecipientDirectory>,
        senders: Vec<Arc<dyn ChannelSender>>,
        config: RetryConfig,
    ) -> Self {
        Self {
            store,
            directory,
            senders: senders.into_iter().map(|s| (s.channel(), s)).collect(),
            policy: RetryPolicy::from_config(&config),
            config,
        }
    }

    /// Run until the shutdown signal flips to true.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            tick_interval_seconds = self.config.tick_interval_seconds,
            max_attempts = self.config.max_attempts,
            "Retry scheduler started"
        );

        let mut ticker = interval(Duration::from_secs(self.config.tick_interval_seconds.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first interval tick fires immediately; consume it so the
        // scheduler waits a full interval before its first pass.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Retry scheduler received shutdown signal");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    match self.tick().await {
                        Ok(stats) if stats.scanned > 0 => {
                            info!(
                                scanned = stats.scanned,
                                retried = stats.retried,
                                succeeded = stats.succeeded,
                                failed = stats.failed,
                                skipped = stats.skipped,
                                "Retry tick complete"
                            );
                        }
                        Ok(_) => debug!("Retry tick found nothing to do"),
                        Err(e) => warn!(error = %e, "Retry tick failed"),
                    }
                }
            }
        }

        info!("Retry scheduler stopped");
    }

    /// One pass over the retryable rows.
    pub async fn tick(&self) -> AppResult<TickStats> {
        let now = Utc::now();
        let rows = self
            .store
            .find_retryable(self.config.max_attempts, self.config.batch_size)
            .await?;

        let mut stats = TickStats {
            scanned: rows.len(),
            ..TickStats::default()
        };

        for row in rows {
            if !self.policy.is_eligible(&row, now) {
                stats.skipped += 1;
                continue;
            }
            match self.retry_row(&row).await {
                Ok(true) => {
                    stats.retried += 1;
                    stats.succeeded += 1;
                }
                Ok(false) => {
                    stats.retried += 1;
                    stats.failed += 1;
                }
                Err(e) => {
                    // Failure isolation: count it and move on.
                    warn!(delivery_id = %row.id, error = %e, "Retry attempt errored");
                    stats.skipped += 1;
                }
            }
        }

        Ok(stats)
    }

    /// Re-attempt one row. Returns whether the channel accepted it.
    async fn retry_row(&self, row: &DeliveryRecord) -> AppResult<bool> {
        let Some(sender) = self.senders.get(&row.channel) else {
            self.store
                .update_status(
                    row.id,
                    DeliveryState::Failed,
                    Some("CHANNEL_NOT_CONFIGURED"),
                    None,
                )
                .await?;
            return Ok(false);
        };

        // Addressing data is not stored on the row; rehydrate it.
        let Some(recipient) = self.directory.find(row.recipient_id).await? else {
            self.store
                .update_status(row.id, DeliveryState::Failed, Some("RECIPIENT_NOT_FOUND"), None)
                .await?;
            return Ok(false);
        };

        let content = RenderedMessage {
            title: row.title.clone(),
            body: row.body.clone(),
            action_text: None,
        };
        let ctx = SendContext {
            notification_id: row.notification_id,
            event: row.event,
            priority: row.priority,
        };

        match sender.send(&recipient, &content, ctx).await {
            Ok(outcome) if outcome.success => {
                self.store
                    .update_status(
                        row.id,
                        DeliveryState::Sent,
                        None,
                        outcome.external_id.as_deref(),
                    )
                    .await?;
                debug!(delivery_id = %row.id, channel = %row.channel, "Retry succeeded");
                Ok(true)
            }
            Ok(outcome) => {
                self.store
                    .update_status(
                        row.id,
                        DeliveryState::Failed,
                        outcome.error.as_deref().or(Some("SEND_FAILED")),
                        None,
                    )
                    .await?;
                Ok(false)
            }
            Err(e) => {
                self.store
                    .update_status(row.id, DeliveryState::Failed, Some(&e.to_string()), None)
                    .await?;
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamsa_channels::mock::MockSender;
    use lamsa_database::memory::{MemoryDeliveryStore, StaticRecipientDirectory};
    use lamsa_database::store::NewDelivery;
    use lamsa_entity::notification::{
        NotificationEvent, Priority, Recipient, RecipientKind,
    };
    use uuid::Uuid;

    fn scheduler_with(
        sender: Arc<MockSender>,
        config: RetryConfig,
    ) -> (RetryScheduler, Arc<MemoryDeliveryStore>, Recipient) {
        let store = Arc::new(MemoryDeliveryStore::new());
        let directory = Arc::new(StaticRecipientDirectory::new());
        let recipient = Recipient::new(Uuid::new_v4(), RecipientKind::Customer);
        directory.insert(recipient.clone());
        let scheduler = RetryScheduler::new(store.clone(), directory, vec![sender], config);
        (scheduler, store, recipient)
    }

    async fn seed_failed_row(
        store: &MemoryDeliveryStore,
        recipient_id: Uuid,
        seconds_ago: i64,
    ) -> DeliveryRecord {
        let row = store
            .track(NewDelivery {
                notification_id: Uuid::new_v4(),
                channel: Channel::Sms,
                event: NotificationEvent::BookingConfirmed,
                priority: Priority::Normal,
                recipient_id,
                status: DeliveryState::Failed,
                attempts: 1,
                title: "t".into(),
                body: "b".into(),
                failure_reason: Some("TIMEOUT".into()),
                external_id: None,
                last_attempt_at: Some(Utc::now() - chrono::Duration::seconds(seconds_ago)),
            })
            .await
            .unwrap();
        row
    }

    fn immediate_config() -> RetryConfig {
        RetryConfig {
            delays_seconds: vec![0, 0, 0],
            ..RetryConfig::default()
        }
    }

    #[tokio::test]
    async fn eligible_row_is_resent_and_marked_sent() {
        let sender = Arc::new(MockSender::succeeding(Channel::Sms));
        let (scheduler, store, recipient) =
            scheduler_with(sender.clone(), immediate_config());
        let row = seed_failed_row(&store, recipient.id, 600).await;

        let stats = scheduler.tick().await.unwrap();
        assert_eq!(stats.succeeded, 1);

        let row = store.get(row.id).unwrap();
        assert_eq!(row.status, DeliveryState::Sent);
        assert_eq!(row.attempts, 2);
        assert_eq!(sender.call_count(), 1);
    }

    #[tokio::test]
    async fn backoff_not_elapsed_skips_the_row() {
        let sender = Arc::new(MockSender::succeeding(Channel::Sms));
        let config = RetryConfig {
            delays_seconds: vec![15, 15, 15],
            ..RetryConfig::default()
        };
        let (scheduler, store, recipient) = scheduler_with(sender.clone(), config);
        seed_failed_row(&store, recipient.id, 2).await;

        let stats = scheduler.tick().await.unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.retried, 0);
        assert_eq!(sender.call_count(), 0);
    }

    #[tokio::test]
    async fn failed_retry_increments_attempts_and_updates_reason() {
        let sender = Arc::new(MockSender::failing(Channel::Sms, "STILL_DOWN"));
        let (scheduler, store, recipient) =
            scheduler_with(sender.clone(), immediate_config());
        let row = seed_failed_row(&store, recipient.id, 600).await;

        let stats = scheduler.tick().await.unwrap();
        assert_eq!(stats.failed, 1);

        let row = store.get(row.id).unwrap();
        assert_eq!(row.status, DeliveryState::Failed);
        assert_eq!(row.attempts, 2);
        assert_eq!(row.failure_reason.as_deref(), Some("STILL_DOWN"));
    }

    #[tokio::test]
    async fn missing_recipient_is_isolated_from_the_batch() {
        let sender = Arc::new(MockSender::succeeding(Channel::Sms));
        let (scheduler, store, recipient) =
            scheduler_with(sender.clone(), immediate_config());
        // One row with an unknown recipient, one retryable.
        seed_failed_row(&store, Uuid::new_v4(), 600).await;
        seed_failed_row(&store, recipient.id, 600).await;

        let stats = scheduler.tick().await.unwrap();
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.retried + stats.skipped, 2);
    }
}
