//! SMS channel with an ordered provider chain.

use std::sync::Arc;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use lamsa_core::config::SmsConfig;
use lamsa_core::result::AppResult;
use lamsa_entity::notification::{Channel, Recipient, RenderedMessage};

use crate::sender::{ChannelSender, SendContext, SendOutcome};

/// Jordanian mobile numbers: +962 7x, 00962 7x, or local 07x, where x is
/// 7, 8, or 9, followed by seven digits.
static JO_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+9627|009627|07)[789]\d{7}$").unwrap());

/// One SMS vendor integration.
#[async_trait]
pub trait SmsGateway: Send + Sync + std::fmt::Debug {
    /// Provider name, for logs and failure reasons.
    fn name(&self) -> &str;

    /// Submit one message. Returns the vendor message id.
    async fn send_sms(&self, phone: &str, sender_id: &str, body: &str) -> AppResult<String>;
}

/// SMS sender over an ordered chain of provider gateways.
///
/// Providers are tried in order; the first accepted send wins. When
/// every provider fails, the first provider's error is reported so the
/// caller sees the root cause rather than the last fallback's.
#[derive(Debug)]
pub struct SmsSender {
    providers: Vec<Arc<dyn SmsGateway>>,
    sender_id: String,
    timeout: Duration,
}

impl SmsSender {
    pub fn new(providers: Vec<Arc<dyn SmsGateway>>, config: &SmsConfig) -> Self {
        Self {
            providers,
            sender_id: config.sender_id.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    /// Validate and normalize a phone number to local `07xxxxxxxx` form.
    fn normalize(phone: &str) -> Option<String> {
        let trimmed = phone.trim().replace([' ', '-'], "");
        if !JO_MOBILE.is_match(&trimmed) {
            return None;
        }
        let local = if let Some(rest) = trimmed.strip_prefix("+962") {
            format!("0{rest}")
        } else if let Some(rest) = trimmed.strip_prefix("00962") {
            format!("0{rest}")
        } else {
            trimmed
        };
        Some(local)
    }
}

#[async_trait]
impl ChannelSender for SmsSender {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    async fn send(
        &self,
        recipient: &Recipient,
        content: &RenderedMessage,
        ctx: SendContext,
    ) -> AppResult<SendOutcome> {
        let notification_id = ctx.notification_id;
        let Some(phone) = recipient.phone.as_deref() else {
            return Ok(SendOutcome::failed("NO_PHONE"));
        };
        // Validation failures never reach a vendor.
        let Some(phone) = Self::normalize(phone) else {
            return Ok(SendOutcome::failed("INVALID_PHONE"));
        };
        if self.providers.is_empty() {
            return Ok(SendOutcome::failed("NO_SMS_PROVIDER_CONFIGURED"));
        }

        let mut first_error: Option<String> = None;
        for provider in &self.providers {
            let attempt =
                tokio::time::timeout(self.timeout, provider.send_sms(&phone, &self.sender_id, &content.body))
                    .await;
            match attempt {
                Ok(Ok(external_id)) => {
                    debug!(
                        %notification_id,
                        provider = provider.name(),
                        external_id = %external_id,
                        "SMS accepted"
                    );
                    return Ok(SendOutcome::sent(external_id));
                }
                Ok(Err(e)) => {
                    warn!(%notification_id, provider = provider.name(), error = %e, "SMS provider failed");
                    first_error.get_or_insert_with(|| format!("{}: {}", provider.name(), e.message));
                }
                Err(_) => {
                    warn!(%notification_id, provider = provider.name(), "SMS provider timed out");
                    first_error
                        .get_or_insert_with(|| format!("{}: vendor call timed out", provider.name()));
                }
            }
        }

        Ok(SendOutcome::failed(
            first_error.unwrap_or_else(|| "SMS_SEND_FAILED".to_owned()),
        ))
    }
}
