//! Shared test fixtures for the pipeline tests.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use lamsa_channels::mock::MockSender;
use lamsa_channels::ChannelSender;
use lamsa_core::config::{NotificationsConfig, RetryConfig};
use lamsa_database::memory::{MemoryDeliveryStore, StaticRecipientDirectory};
use lamsa_dispatch::{NotificationDispatcher, TemplateCatalog};
use lamsa_entity::notification::{
    Channel, Language, NotificationEvent, NotificationRequest, Recipient, RecipientKind,
};
use lamsa_worker::RetryScheduler;

/// Full pipeline fixture: dispatcher and retry scheduler sharing one
/// store, one recipient directory, and one set of channel doubles.
pub struct TestPipeline {
    pub store: Arc<MemoryDeliveryStore>,
    pub directory: Arc<StaticRecipientDirectory>,
    pub dispatcher: NotificationDispatcher,
    pub scheduler: RetryScheduler,
}

impl TestPipeline {
    pub fn new(senders: Vec<Arc<MockSender>>) -> Self {
        Self::with_retry_config(senders, immediate_retry_config())
    }

    pub fn with_retry_config(senders: Vec<Arc<MockSender>>, retry: RetryConfig) -> Self {
        let store = Arc::new(MemoryDeliveryStore::new());
        let directory = Arc::new(StaticRecipientDirectory::new());
        let senders: Vec<Arc<dyn ChannelSender>> = senders
            .into_iter()
            .map(|s| s as Arc<dyn ChannelSender>)
            .collect();

        let dispatcher = NotificationDispatcher::new(
            senders.clone(),
            store.clone(),
            Arc::new(TemplateCatalog::builtin()),
            NotificationsConfig::default(),
        );
        let scheduler = RetryScheduler::new(store.clone(), directory.clone(), senders, retry);

        Self {
            store,
            directory,
            dispatcher,
            scheduler,
        }
    }

    /// Seed a reachable customer into the directory and return it.
    pub fn seed_recipient(&self) -> Recipient {
        let recipient = test_recipient();
        self.directory.insert(recipient.clone());
        recipient
    }
}

/// A customer with every channel addressable.
pub fn test_recipient() -> Recipient {
    let mut r = Recipient::new(Uuid::new_v4(), RecipientKind::Customer);
    r.phone = Some("0791234567".to_owned());
    r.device_token = Some("ExponentPushToken[integration-test]".to_owned());
    r.language = Language::En;
    r
}

/// A booking-confirmed request with realistic substitution data.
pub fn booking_request(recipient: Recipient, channels: Vec<Channel>) -> NotificationRequest {
    NotificationRequest::new(NotificationEvent::BookingConfirmed, recipient, channels).with_data(
        json!({
            "salon_name": "Glow Beauty Lounge",
            "date": "2025-06-14",
            "time": "16:00",
        }),
    )
}

/// Retry config with no backoff, so ticks act on rows immediately.
pub fn immediate_retry_config() -> RetryConfig {
    RetryConfig {
        delays_seconds: vec![0, 0, 0],
        ..RetryConfig::default()
    }
}
