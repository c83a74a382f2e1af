//! Dispatch failure followed by scheduler recovery.

use std::sync::Arc;

use lamsa_channels::mock::MockSender;
use lamsa_core::config::RetryConfig;
use lamsa_database::store::DeliveryStore;
use lamsa_entity::notification::{Channel, DeliveryState};

use crate::helpers::{booking_request, immediate_retry_config, TestPipeline};

#[tokio::test]
async fn failed_dispatch_is_recovered_on_the_next_tick() {
    // SMS rejects the dispatch attempt, then accepts the retry.
    let sms = Arc::new(MockSender::fail_times(Channel::Sms, 1, "VENDOR_DOWN"));
    let pipeline = TestPipeline::new(vec![sms.clone()]);
    let recipient = pipeline.seed_recipient();

    let result = pipeline
        .dispatcher
        .dispatch(booking_request(recipient, vec![Channel::Sms]))
        .await
        .unwrap();

    assert!(!result.success);
    let row = &result.deliveries[0];
    assert_eq!(row.status, DeliveryState::Failed);
    assert_eq!(row.attempts, 1);

    let stats = pipeline.scheduler.tick().await.unwrap();
    assert_eq!(stats.succeeded, 1);

    // The same row, mutated in place: no second row appears and the
    // attempt counter spans both the dispatch and the retry.
    let rows = pipeline
        .store
        .find_by_notification(result.notification_id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, row.id);
    assert_eq!(rows[0].status, DeliveryState::Sent);
    assert_eq!(rows[0].attempts, 2);
    assert_eq!(sms.call_count(), 2);
}

#[tokio::test]
async fn exhausted_rows_leave_the_retry_pool() {
    let sms = Arc::new(MockSender::failing(Channel::Sms, "VENDOR_DOWN"));
    let pipeline = TestPipeline::with_retry_config(
        vec![sms.clone()],
        RetryConfig {
            max_attempts: 3,
            ..immediate_retry_config()
        },
    );
    let recipient = pipeline.seed_recipient();

    let result = pipeline
        .dispatcher
        .dispatch(booking_request(recipient, vec![Channel::Sms]))
        .await
        .unwrap();
    let row_id = result.deliveries[0].id;

    // Tick until the row exhausts its budget, then once more.
    for _ in 0..3 {
        pipeline.scheduler.tick().await.unwrap();
    }
    let stats = pipeline.scheduler.tick().await.unwrap();
    assert_eq!(stats.scanned, 0);

    let row = pipeline.store.get(row_id).unwrap();
    assert_eq!(row.status, DeliveryState::Failed);
    assert_eq!(row.attempts, 3);
    // Dispatch plus two scheduler retries; the exhausted row is never
    // offered to the channel again.
    assert_eq!(sms.call_count(), 3);
}

#[tokio::test]
async fn rendered_content_survives_into_the_retry_send() {
    let sms = Arc::new(MockSender::fail_times(Channel::Sms, 1, "VENDOR_DOWN"));
    let pipeline = TestPipeline::new(vec![sms]);
    let recipient = pipeline.seed_recipient();

    let result = pipeline
        .dispatcher
        .dispatch(booking_request(recipient, vec![Channel::Sms]))
        .await
        .unwrap();
    let body_at_dispatch = result.deliveries[0].body.clone();
    assert!(body_at_dispatch.contains("Glow Beauty Lounge"));

    pipeline.scheduler.tick().await.unwrap();

    // The retry re-sends the stored rendering, byte for byte.
    let row = pipeline.store.get(result.deliveries[0].id).unwrap();
    assert_eq!(row.status, DeliveryState::Sent);
    assert_eq!(row.body, body_at_dispatch);
}
