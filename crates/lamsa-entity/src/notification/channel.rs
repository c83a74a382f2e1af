//! Delivery channel enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A delivery mechanism for one notification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "delivery_channel", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Text message to the recipient's phone.
    Sms,
    /// Mobile push notification to the recipient's device token.
    Push,
    /// Real-time message over an active WebSocket connection.
    Websocket,
    /// Email (stub channel, not yet wired to a provider).
    Email,
}

impl Channel {
    /// All channels in default attempt order.
    pub const ALL: [Channel; 4] = [
        Channel::Push,
        Channel::Websocket,
        Channel::Sms,
        Channel::Email,
    ];

    /// Return the channel as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::Push => "push",
            Self::Websocket => "websocket",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
