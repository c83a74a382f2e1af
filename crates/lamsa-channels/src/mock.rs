//! Scriptable gateway and sender doubles.
//!
//! Used by unit and integration tests, and wired as the default
//! gateways in deployments that have no vendor credentials configured.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use lamsa_core::error::AppError;
use lamsa_core::result::AppResult;
use lamsa_entity::notification::{Channel, Recipient, RenderedMessage};

use crate::push::PushGateway;
use crate::sender::{ChannelSender, SendContext, SendOutcome};
use crate::sms::SmsGateway;

/// SMS gateway double that fails a set number of leading calls and
/// records every phone number it was asked to message.
#[derive(Debug)]
pub struct MockSmsGateway {
    name: String,
    fail_first: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl MockSmsGateway {
    /// Gateway that accepts every message.
    pub fn succeeding(name: impl Into<String>) -> Self {
        Self::fail_times(name, 0)
    }

    /// Gateway that rejects every message.
    pub fn failing(name: impl Into<String>) -> Self {
        Self::fail_times(name, usize::MAX)
    }

    /// Gateway that rejects the first `n` messages, then accepts.
    pub fn fail_times(name: impl Into<String>, n: usize) -> Self {
        Self {
            name: name.into(),
            fail_first: AtomicUsize::new(n),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Phone numbers passed to this gateway, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

#[async_trait]
impl SmsGateway for MockSmsGateway {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send_sms(&self, phone: &str, _sender_id: &str, _body: &str) -> AppResult<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(phone.to_owned());
        }
        let remaining = self.fail_first.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != usize::MAX {
                self.fail_first.store(remaining - 1, Ordering::SeqCst);
            }
            return Err(AppError::delivery(format!("{} rejected message", self.name)));
        }
        Ok(format!("{}-{}", self.name, Uuid::new_v4()))
    }
}

/// Push gateway double with the same fail-then-succeed scripting.
#[derive(Debug)]
pub struct MockPushGateway {
    name: String,
    fail_first: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl MockPushGateway {
    pub fn succeeding(name: impl Into<String>) -> Self {
        Self::fail_times(name, 0)
    }

    pub fn failing(name: impl Into<String>) -> Self {
        Self::fail_times(name, usize::MAX)
    }

    pub fn fail_times(name: impl Into<String>, n: usize) -> Self {
        Self {
            name: name.into(),
            fail_first: AtomicUsize::new(n),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Device tokens passed to this gateway, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

#[async_trait]
impl PushGateway for MockPushGateway {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send_push(&self, token: &str, _title: &str, _body: &str) -> AppResult<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(token.to_owned());
        }
        let remaining = self.fail_first.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != usize::MAX {
                self.fail_first.store(remaining - 1, Ordering::SeqCst);
            }
            return Err(AppError::delivery(format!("{} rejected message", self.name)));
        }
        Ok(format!("{}-ticket-{}", self.name, Uuid::new_v4()))
    }
}

/// Whole-channel double for dispatcher and scheduler tests.
#[derive(Debug)]
pub struct MockSender {
    channel: Channel,
    fail_first: AtomicUsize,
    error: String,
    calls: AtomicUsize,
}

impl MockSender {
    pub fn succeeding(channel: Channel) -> Self {
        Self::fail_times(channel, 0, "MOCK_FAILURE")
    }

    pub fn failing(channel: Channel, error: impl Into<String>) -> Self {
        Self::fail_times(channel, usize::MAX, error)
    }

    pub fn fail_times(channel: Channel, n: usize, error: impl Into<String>) -> Self {
        Self {
            channel,
            fail_first: AtomicUsize::new(n),
            error: error.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChannelSender for MockSender {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn send(
        &self,
        _recipient: &Recipient,
        _content: &RenderedMessage,
        _ctx: SendContext,
    ) -> AppResult<SendOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.fail_first.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != usize::MAX {
                self.fail_first.store(remaining - 1, Ordering::SeqCst);
            }
            return Ok(SendOutcome::failed(self.error.clone()));
        }
        Ok(SendOutcome::sent(format!("mock-{}", self.channel)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sms::SmsSender;
    use lamsa_core::config::SmsConfig;
    use lamsa_entity::notification::{NotificationEvent, Priority, RecipientKind};
    use std::sync::Arc;

    fn recipient_with_phone(phone: &str) -> Recipient {
        let mut r = Recipient::new(Uuid::new_v4(), RecipientKind::Customer);
        r.phone = Some(phone.to_owned());
        r
    }

    fn ctx() -> SendContext {
        SendContext {
            notification_id: Uuid::new_v4(),
            event: NotificationEvent::BookingConfirmed,
            priority: Priority::Normal,
        }
    }

    fn content() -> RenderedMessage {
        RenderedMessage {
            title: "t".into(),
            body: "b".into(),
            action_text: None,
        }
    }

    #[tokio::test]
    async fn fallback_provider_used_when_primary_fails() {
        let primary = Arc::new(MockSmsGateway::failing("primary"));
        let fallback = Arc::new(MockSmsGateway::succeeding("fallback"));
        let sender = SmsSender::new(
            vec![primary.clone() as Arc<dyn SmsGateway>, fallback.clone()],
            &SmsConfig::default(),
        );

        let outcome = sender
            .send(&recipient_with_phone("0791234567"), &content(), ctx())
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(primary.call_count(), 1);
        assert_eq!(fallback.call_count(), 1);
    }

    #[tokio::test]
    async fn primary_error_reported_when_all_providers_fail() {
        let sender = SmsSender::new(
            vec![
                Arc::new(MockSmsGateway::failing("primary")) as Arc<dyn SmsGateway>,
                Arc::new(MockSmsGateway::failing("fallback")),
            ],
            &SmsConfig::default(),
        );

        let outcome = sender
            .send(&recipient_with_phone("0791234567"), &content(), ctx())
            .await
            .unwrap();

        assert!(!outcome.success);
        let error = outcome.error.unwrap();
        assert!(error.starts_with("primary:"), "got: {error}");
    }

    #[tokio::test]
    async fn invalid_phone_never_reaches_a_provider() {
        let primary = Arc::new(MockSmsGateway::succeeding("primary"));
        let sender = SmsSender::new(
            vec![primary.clone() as Arc<dyn SmsGateway>],
            &SmsConfig::default(),
        );

        let outcome = sender
            .send(&recipient_with_phone("+14155551234"), &content(), ctx())
            .await
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("INVALID_PHONE"));
        assert_eq!(primary.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_phone_is_no_phone() {
        let sender = SmsSender::new(
            vec![Arc::new(MockSmsGateway::succeeding("primary")) as Arc<dyn SmsGateway>],
            &SmsConfig::default(),
        );
        let recipient = Recipient::new(Uuid::new_v4(), RecipientKind::Customer);

        let outcome = sender.send(&recipient, &content(), ctx()).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("NO_PHONE"));
    }
}
