//! The uniform send capability all channels implement.

use async_trait::async_trait;
use uuid::Uuid;

use lamsa_core::result::AppResult;
use lamsa_entity::notification::{
    Channel, NotificationEvent, Priority, Recipient, RenderedMessage,
};

/// Outcome of one channel send attempt.
///
/// Expected failure modes (no phone, vendor timeout, recipient offline)
/// come back as `success == false` with a reason code, never as an
/// `Err`. `Err` is reserved for genuinely unexpected faults; the
/// dispatcher converts those to failed records too.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    /// Whether the vendor accepted the message.
    pub success: bool,
    /// Vendor-assigned message id, when accepted.
    pub external_id: Option<String>,
    /// Failure reason code or message, when rejected.
    pub error: Option<String>,
}

impl SendOutcome {
    /// Successful outcome with a vendor message id.
    pub fn sent(external_id: impl Into<String>) -> Self {
        Self {
            success: true,
            external_id: Some(external_id.into()),
            error: None,
        }
    }

    /// Successful outcome with no vendor id (in-process channels).
    pub fn sent_untracked() -> Self {
        Self {
            success: true,
            external_id: None,
            error: None,
        }
    }

    /// Structured failure.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            external_id: None,
            error: Some(error.into()),
        }
    }
}

/// Per-notification metadata handed to every sender alongside the
/// rendered content.
#[derive(Debug, Clone, Copy)]
pub struct SendContext {
    pub notification_id: Uuid,
    pub event: NotificationEvent,
    pub priority: Priority,
}

/// A delivery channel.
#[async_trait]
pub trait ChannelSender: Send + Sync + std::fmt::Debug {
    /// The channel this sender serves.
    fn channel(&self) -> Channel;

    /// Attempt delivery of rendered content to one recipient.
    async fn send(
        &self,
        recipient: &Recipient,
        content: &RenderedMessage,
        ctx: SendContext,
    ) -> AppResult<SendOutcome>;
}
