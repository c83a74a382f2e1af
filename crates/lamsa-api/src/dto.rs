//! Request and response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lamsa_entity::notification::{Channel, DeliveryRecord, NotificationEvent, Priority};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// POST /api/notifications request body.
///
/// The recipient is referenced by id and resolved through the account
/// directory; callers never supply addressing data directly.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchRequestBody {
    pub event: NotificationEvent,
    pub recipient_id: Uuid,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub priority: Priority,
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// POST /api/notifications response payload.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchResponse {
    /// Whether at least one channel succeeded or the request was parked.
    pub success: bool,
    /// Id shared by all delivery rows for this notification.
    pub notification_id: Uuid,
    /// Dispatch-level failure code, when nothing was attempted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Per-channel delivery records created by this call.
    pub deliveries: Vec<DeliveryRecord>,
}
