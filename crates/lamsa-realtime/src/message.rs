//! Wire format for messages pushed to WebSocket clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lamsa_entity::notification::{NotificationEvent, Priority};

/// Message sent from the server to a connected client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// A rendered notification push.
    Notification {
        notification_id: Uuid,
        event: NotificationEvent,
        priority: Priority,
        title: String,
        body: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        action_text: Option<String>,
        created_at: DateTime<Utc>,
    },
    /// Heartbeat response.
    Pong,
    /// Server-side notice (shutdown, forced disconnect).
    System { message: String },
}

/// Message sent from a connected client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Heartbeat request.
    Ping,
    /// Subscribe this connection to a named room (e.g. a salon's staff
    /// feed).
    JoinRoom { room: String },
    /// Unsubscribe this connection from a named room.
    LeaveRoom { room: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_frames_parse_from_client_json() {
        let msg: InboundMessage = serde_json::from_str(r#"{"type": "ping"}"#).unwrap();
        assert!(matches!(msg, InboundMessage::Ping));

        let msg: InboundMessage =
            serde_json::from_str(r#"{"type": "join_room", "room": "salon:42"}"#).unwrap();
        assert!(matches!(msg, InboundMessage::JoinRoom { room } if room == "salon:42"));

        assert!(serde_json::from_str::<InboundMessage>("not json").is_err());
    }
}
