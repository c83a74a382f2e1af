//! Dispatch flows across channels, preferences, and delivery tracking.

use std::sync::Arc;

use lamsa_channels::mock::MockSender;
use lamsa_database::store::{DeliveryStore, RecipientDirectory};
use lamsa_entity::notification::{Channel, DeliveryState, Priority};
use serde_json::json;

use crate::helpers::{booking_request, TestPipeline};

#[tokio::test]
async fn dispatch_writes_one_tracked_row_per_attempted_channel() {
    let sms = Arc::new(MockSender::failing(Channel::Sms, "VENDOR_DOWN"));
    let push = Arc::new(MockSender::succeeding(Channel::Push));
    let pipeline = TestPipeline::new(vec![sms.clone(), push.clone()]);
    let recipient = pipeline.seed_recipient();

    let result = pipeline
        .dispatcher
        .dispatch(booking_request(
            recipient,
            vec![Channel::Sms, Channel::Push],
        ))
        .await
        .unwrap();

    assert!(result.success);

    let rows = pipeline
        .store
        .find_by_notification(result.notification_id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    let sms_row = rows.iter().find(|r| r.channel == Channel::Sms).unwrap();
    assert_eq!(sms_row.status, DeliveryState::Failed);
    assert_eq!(sms_row.attempts, 1);
    assert_eq!(sms_row.failure_reason.as_deref(), Some("VENDOR_DOWN"));

    let push_row = rows.iter().find(|r| r.channel == Channel::Push).unwrap();
    assert_eq!(push_row.status, DeliveryState::Sent);
    assert_eq!(push_row.attempts, 1);
    assert!(push_row.external_id.is_some());
}

#[tokio::test]
async fn urgent_dispatch_fans_out_and_stats_count_every_row() {
    let sms = Arc::new(MockSender::succeeding(Channel::Sms));
    let push = Arc::new(MockSender::failing(Channel::Push, "NO_DEVICE_TOKEN"));
    let ws = Arc::new(MockSender::succeeding(Channel::Websocket));
    let pipeline = TestPipeline::new(vec![sms.clone(), push.clone(), ws.clone()]);
    let recipient = pipeline.seed_recipient();

    let result = pipeline
        .dispatcher
        .dispatch(
            booking_request(
                recipient,
                vec![Channel::Sms, Channel::Push, Channel::Websocket],
            )
            .with_priority(Priority::Urgent),
        )
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(sms.call_count(), 1);
    assert_eq!(push.call_count(), 1);
    assert_eq!(ws.call_count(), 1);

    let stats = pipeline
        .store
        .stats(result.notification_id)
        .await
        .unwrap();
    assert_eq!(stats.sent, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.total(), 3);
}

#[tokio::test]
async fn preference_update_through_the_directory_gates_the_next_dispatch() {
    let sms = Arc::new(MockSender::succeeding(Channel::Sms));
    let push = Arc::new(MockSender::succeeding(Channel::Push));
    let pipeline = TestPipeline::new(vec![sms.clone(), push.clone()]);
    let recipient = pipeline.seed_recipient();

    pipeline
        .directory
        .upsert_preferences(recipient.id, &json!({"sms": false}))
        .await
        .unwrap();

    // Dispatch with the refreshed snapshot, as a caller re-reading the
    // directory would.
    let refreshed = pipeline
        .directory
        .find(recipient.id)
        .await
        .unwrap()
        .unwrap();
    let result = pipeline
        .dispatcher
        .dispatch(booking_request(
            refreshed,
            vec![Channel::Sms, Channel::Push],
        ))
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(sms.call_count(), 0);
    assert_eq!(push.call_count(), 1);
    assert_eq!(result.deliveries[0].channel, Channel::Push);
}

#[tokio::test]
async fn separate_dispatches_never_share_delivery_rows() {
    let sms = Arc::new(MockSender::succeeding(Channel::Sms));
    let pipeline = TestPipeline::new(vec![sms]);
    let recipient = pipeline.seed_recipient();

    let first = pipeline
        .dispatcher
        .dispatch(booking_request(recipient.clone(), vec![Channel::Sms]))
        .await
        .unwrap();
    let second = pipeline
        .dispatcher
        .dispatch(booking_request(recipient, vec![Channel::Sms]))
        .await
        .unwrap();

    assert_ne!(first.notification_id, second.notification_id);
    assert_eq!(
        pipeline
            .store
            .find_by_notification(first.notification_id)
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        pipeline
            .store
            .find_by_notification(second.notification_id)
            .await
            .unwrap()
            .len(),
        1
    );
}
