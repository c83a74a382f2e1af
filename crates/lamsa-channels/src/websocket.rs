//! In-app channel over the WebSocket connection registry.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use lamsa_core::result::AppResult;
use lamsa_entity::notification::{Channel, Recipient, RenderedMessage};
use lamsa_realtime::{ConnectionRegistry, OutboundMessage};

use crate::sender::{ChannelSender, SendContext, SendOutcome};

/// Pushes notifications to a recipient's live connections.
///
/// A recipient with no live connection is an unavailable channel, the
/// same failure class as a vendor timeout, and comes back as a
/// structured outcome so the fallback loop moves on.
#[derive(Debug)]
pub struct WebsocketSender {
    registry: Arc<ConnectionRegistry>,
}

impl WebsocketSender {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    fn frame(content: &RenderedMessage, ctx: SendContext) -> OutboundMessage {
        OutboundMessage::Notification {
            notification_id: ctx.notification_id,
            event: ctx.event,
            priority: ctx.priority,
            title: content.title.clone(),
            body: content.body.clone(),
            action_text: content.action_text.clone(),
            created_at: Utc::now(),
        }
    }

    /// Fan a frame out to every member of a room.
    pub fn send_to_room(&self, room: &str, content: &RenderedMessage, ctx: SendContext) -> usize {
        self.registry.send_to_room(room, &Self::frame(content, ctx))
    }

    /// Fan a frame out to every connected client.
    pub fn broadcast(&self, content: &RenderedMessage, ctx: SendContext) -> usize {
        self.registry.broadcast(&Self::frame(content, ctx))
    }
}

#[async_trait]
impl ChannelSender for WebsocketSender {
    fn channel(&self) -> Channel {
        Channel::Websocket
    }

    async fn send(
        &self,
        recipient: &Recipient,
        content: &RenderedMessage,
        ctx: SendContext,
    ) -> AppResult<SendOutcome> {
        if !self.registry.is_online(&recipient.id) {
            return Ok(SendOutcome::failed("RECIPIENT_NOT_CONNECTED"));
        }

        let delivered = self
            .registry
            .send_to_recipient(&recipient.id, &Self::frame(content, ctx));

        if delivered > 0 {
            debug!(
                notification_id = %ctx.notification_id,
                recipient_id = %recipient.id,
                connections = delivered,
                "WebSocket push delivered"
            );
            Ok(SendOutcome::sent_untracked())
        } else {
            // Connections dropped between the presence check and the send.
            Ok(SendOutcome::failed("RECIPIENT_NOT_CONNECTED"))
        }
    }
}
