//! The notification dispatcher.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use lamsa_channels::{ChannelSender, SendContext};
use lamsa_core::config::NotificationsConfig;
use lamsa_core::result::AppResult;
use lamsa_database::store::{DeliveryStore, NewDelivery};
use lamsa_entity::notification::{
    Channel, DeliveryRecord, DeliveryState, NotificationRequest, RenderedMessage,
};

use crate::preferences::filter_channels;
use crate::quiet::is_in_quiet_hours;
use crate::templates::catalog::TemplateCatalog;
use crate::templates::render::render;

/// Aggregated outcome of one dispatch call.
#[derive(Debug)]
pub struct DispatchResult {
    /// Whether at least one channel succeeded (or the request was parked).
    pub success: bool,
    /// The generated notification id, shared by all delivery rows.
    pub notification_id: Uuid,
    /// Dispatch-level failure code, when nothing was attempted.
    pub error: Option<String>,
    /// Per-channel delivery records created by this call.
    pub deliveries: Vec<DeliveryRecord>,
}

impl DispatchResult {
    fn failure(notification_id: Uuid, error: impl Into<String>) -> Self {
        Self {
            success: false,
            notification_id,
            error: Some(error.into()),
            deliveries: Vec::new(),
        }
    }
}

/// Routes one notification request through rendering, preference and
/// quiet-hours policy, and the ordered channel fallback loop.
#[derive(Debug)]
pub struct NotificationDispatcher {
    senders: HashMap<Channel, Arc<dyn ChannelSender>>,
    store: Arc<dyn DeliveryStore>,
    templates: Arc<TemplateCatalog>,
    config: NotificationsConfig,
}

impl NotificationDispatcher {
    pub fn new(
        senders: Vec<Arc<dyn ChannelSender>>,
        store: Arc<dyn DeliveryStore>,
        templates: Arc<TemplateCatalog>,
        config: NotificationsConfig,
    ) -> Self {
        Self {
            senders: senders.into_iter().map(|s| (s.channel(), s)).collect(),
            store,
            templates,
            config,
        }
    }

    /// Dispatch a request now.
    pub async fn dispatch(&self, request: NotificationRequest) -> AppResult<DispatchResult> {
        self.dispatch_at(request, Utc::now()).await
    }

    /// Dispatch a request as of a given instant. Split out so tests can
    /// pin the clock.
    pub async fn dispatch_at(
        &self,
        request: NotificationRequest,
        now: DateTime<Utc>,
    ) -> AppResult<DispatchResult> {
        let notification_id = Uuid::new_v4();

        if request.is_expired(now) {
            debug!(%notification_id, event = %request.event, "Request expired before dispatch");
            return Ok(DispatchResult::failure(notification_id, "EXPIRED"));
        }

        if request.channels.is_empty() {
            return Ok(DispatchResult::failure(notification_id, "NO_ENABLED_CHANNELS"));
        }

        if self.config.quiet_hours_enforced
            && is_in_quiet_hours(&request.recipient, now, self.config.utc_offset_minutes)
        {
            return self.park(notification_id, &request).await;
        }

        let channels = filter_channels(&request.recipient, request.event, &request.channels);
        if channels.is_empty() {
            debug!(%notification_id, recipient_id = %request.recipient.id, "All channels disabled by preferences");
            return Ok(DispatchResult::failure(notification_id, "NO_ENABLED_CHANNELS"));
        }

        // One rendering serves every channel, keyed on the first filtered
        // channel's template.
        let Some(template) = self.templates.lookup(request.event, channels[0]) else {
            warn!(%notification_id, event = %request.event, channel = %channels[0], "No template registered");
            return Ok(DispatchResult::failure(notification_id, "TEMPLATE_NOT_FOUND"));
        };
        let content = render(template, request.recipient.language, &request.data);

        let ctx = SendContext {
            notification_id,
            event: request.event,
            priority: request.priority,
        };
        let attempt_all = request.priority.attempts_all_channels();
        let mut deliveries = Vec::with_capacity(channels.len());
        let mut any_success = false;

        for channel in channels {
            let (succeeded, external_id, failure_reason) =
                self.attempt(channel, &request, &content, ctx).await;
            let record = self
                .store
                .track(NewDelivery {
                    notification_id,
                    channel,
                    event: request.event,
                    priority: request.priority,
                    recipient_id: request.recipient.id,
                    status: if succeeded {
                        DeliveryState::Sent
                    } else {
                        DeliveryState::Failed
                    },
                    attempts: 1,
                    title: content.title.clone(),
                    body: content.body.clone(),
                    failure_reason,
                    external_id,
                    last_attempt_at: Some(now),
                })
                .await?;
            deliveries.push(record);

            if succeeded {
                any_success = true;
                if !attempt_all {
                    break;
                }
            }
        }

        info!(
            %notification_id,
            event = %request.event,
            recipient_id = %request.recipient.id,
            success = any_success,
            attempted = deliveries.len(),
            "Dispatch complete"
        );

        Ok(DispatchResult {
            success: any_success,
            notification_id,
            error: None,
            deliveries,
        })
    }

    /// One channel attempt: (succeeded, external_id, failure_reason).
    async fn attempt(
        &self,
        channel: Channel,
        request: &NotificationRequest,
        content: &RenderedMessage,
        ctx: SendContext,
    ) -> (bool, Option<String>, Option<String>) {
        let Some(sender) = self.senders.get(&channel) else {
            return (false, None, Some("CHANNEL_NOT_CONFIGURED".to_owned()));
        };

        match sender.send(&request.recipient, content, ctx).await {
            Ok(outcome) if outcome.success => (true, outcome.external_id, None),
            Ok(outcome) => (
                false,
                None,
                Some(outcome.error.unwrap_or_else(|| "SEND_FAILED".to_owned())),
            ),
            // Unexpected faults become failed records, never aborts.
            Err(e) => {
                warn!(notification_id = %ctx.notification_id, %channel, error = %e, "Channel sender fault");
                (false, None, Some(e.to_string()))
            }
        }
    }

    /// Quiet-hours parking: one pending row for the first requested
    /// channel, no sends. Content is rendered best-effort so a later
    /// pass can deliver without re-deriving it.
    async fn park(
        &self,
        notification_id: Uuid,
        request: &NotificationRequest,
    ) -> AppResult<DispatchResult> {
        let channel = request.channels[0];
        let content = self
            .templates
            .lookup(request.event, channel)
            .map(|t| render(t, request.recipient.language, &request.data))
            .unwrap_or_else(|| RenderedMessage {
                title: String::new(),
                body: String::new(),
                action_text: None,
            });

        let record = self
            .store
            .track(NewDelivery {
                notification_id,
                channel,
                event: request.event,
                priority: request.priority,
                recipient_id: request.recipient.id,
                status: DeliveryState::Pending,
                attempts: 0,
                title: content.title,
                body: content.body,
                failure_reason: None,
                external_id: None,
                last_attempt_at: None,
            })
            .await?;

        info!(
            %notification_id,
            recipient_id = %request.recipient.id,
            "Parked in quiet hours"
        );

        Ok(DispatchResult {
            success: true,
            notification_id,
            error: None,
            deliveries: vec![record],
        })
    }
}
