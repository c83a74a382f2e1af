//! Email channel stub.

use async_trait::async_trait;

use lamsa_core::result::AppResult;
use lamsa_entity::notification::{Channel, Recipient, RenderedMessage};

use crate::sender::{ChannelSender, SendContext, SendOutcome};

/// Placeholder email sender.
///
/// Always returns a structured not-implemented failure so it slots into
/// the fallback chain without special-casing; the dispatcher simply
/// moves on to the next channel.
#[derive(Debug, Default)]
pub struct EmailSender;

impl EmailSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChannelSender for EmailSender {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn send(
        &self,
        _recipient: &Recipient,
        _content: &RenderedMessage,
        _ctx: SendContext,
    ) -> AppResult<SendOutcome> {
        Ok(SendOutcome::failed("EMAIL_NOT_IMPLEMENTED"))
    }
}
