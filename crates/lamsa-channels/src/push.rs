//! Push notification channel.

use std::sync::Arc;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};
use uuid::Uuid;

use lamsa_core::config::PushConfig;
use lamsa_core::result::AppResult;
use lamsa_entity::notification::{Channel, Recipient, RenderedMessage};

use crate::sender::{ChannelSender, SendContext, SendOutcome};

/// Expo push token shapes: `ExponentPushToken[...]` or `ExpoPushToken[...]`.
static PUSH_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(ExponentPushToken|ExpoPushToken)\[[A-Za-z0-9_-]+\]$").unwrap());

/// One push vendor integration.
#[async_trait]
pub trait PushGateway: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Submit one message. Returns the vendor ticket id.
    async fn send_push(&self, token: &str, title: &str, body: &str) -> AppResult<String>;
}

/// Push sender over a single vendor gateway.
#[derive(Debug)]
pub struct PushSender {
    gateway: Arc<dyn PushGateway>,
    timeout: Duration,
    batch_size: usize,
}

impl PushSender {
    pub fn new(gateway: Arc<dyn PushGateway>, config: &PushConfig) -> Self {
        Self {
            gateway,
            timeout: Duration::from_secs(config.timeout_seconds),
            batch_size: config.batch_size,
        }
    }

    fn valid_token(token: &str) -> bool {
        PUSH_TOKEN.is_match(token)
    }

    async fn send_one(
        &self,
        recipient: &Recipient,
        content: &RenderedMessage,
        notification_id: Uuid,
    ) -> SendOutcome {
        let Some(token) = recipient.device_token.as_deref() else {
            return SendOutcome::failed("NO_DEVICE_TOKEN");
        };
        if !Self::valid_token(token) {
            return SendOutcome::failed("INVALID_DEVICE_TOKEN");
        }

        let attempt = tokio::time::timeout(
            self.timeout,
            self.gateway.send_push(token, &content.title, &content.body),
        )
        .await;

        match attempt {
            Ok(Ok(ticket_id)) => {
                debug!(%notification_id, ticket_id = %ticket_id, "Push accepted");
                SendOutcome::sent(ticket_id)
            }
            Ok(Err(e)) => {
                warn!(%notification_id, gateway = self.gateway.name(), error = %e, "Push send failed");
                SendOutcome::failed(e.message)
            }
            Err(_) => {
                warn!(%notification_id, gateway = self.gateway.name(), "Push send timed out");
                SendOutcome::failed("PUSH_TIMEOUT")
            }
        }
    }

    /// Send a batch of independent messages.
    ///
    /// Outcomes are returned in input order. A partial-failure batch is
    /// normal; callers inspect each outcome individually. Batches are
    /// chunked to the configured size to keep vendor requests bounded.
    pub async fn send_bulk(
        &self,
        messages: &[(Recipient, RenderedMessage, Uuid)],
    ) -> Vec<SendOutcome> {
        let mut outcomes = Vec::with_capacity(messages.len());
        for chunk in messages.chunks(self.batch_size.max(1)) {
            for (recipient, content, notification_id) in chunk {
                outcomes.push(self.send_one(recipient, content, *notification_id).await);
            }
        }
        outcomes
    }
}

#[async_trait]
impl ChannelSender for PushSender {
    fn channel(&self) -> Channel {
        Channel::Push
    }

    async fn send(
        &self,
        recipient: &Recipient,
        content: &RenderedMessage,
        ctx: SendContext,
    ) -> AppResult<SendOutcome> {
        Ok(self.send_one(recipient, content, ctx.notification_id).await)
    }
}
