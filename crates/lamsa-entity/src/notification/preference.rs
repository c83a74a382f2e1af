//! Per-recipient delivery preferences and quiet hours.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::channel::Channel;
use super::event::EventCategory;

/// A recipient-configured local time window during which proactive
/// notification attempts are deferred.
///
/// Times are `HH:mm` strings. A window whose start is later than its end
/// wraps past midnight (`22:00`–`08:00` covers the night).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietHours {
    /// Window start, `HH:mm`.
    pub start: String,
    /// Window end, `HH:mm` (exclusive).
    pub end: String,
}

impl QuietHours {
    /// Whether `now` falls inside the window.
    ///
    /// Malformed times disable the window rather than blocking delivery.
    pub fn contains(&self, now: NaiveTime) -> bool {
        let (start, end) = match (parse_hhmm(&self.start), parse_hhmm(&self.end)) {
            (Some(s), Some(e)) => (s, e),
            _ => return false,
        };

        if start <= end {
            now >= start && now < end
        } else {
            // Overnight wrap: inside if after start OR before end.
            now >= start || now < end
        }
    }
}

fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// Per-recipient notification settings.
///
/// Every flag defaults to enabled so that a partially-specified
/// preferences object behaves like the unset case for the missing
/// fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Allow SMS delivery.
    #[serde(default = "default_true")]
    pub sms: bool,
    /// Allow push delivery.
    #[serde(default = "default_true")]
    pub push: bool,
    /// Allow real-time WebSocket delivery.
    #[serde(default = "default_true")]
    pub websocket: bool,
    /// Allow email delivery.
    #[serde(default = "default_true")]
    pub email: bool,
    /// Quiet-hours window, if configured.
    #[serde(default)]
    pub quiet_hours: Option<QuietHours>,
    /// Receive booking lifecycle events.
    #[serde(default = "default_true")]
    pub booking_updates: bool,
    /// Receive payment events.
    #[serde(default = "default_true")]
    pub payment_updates: bool,
    /// Receive review events.
    #[serde(default = "default_true")]
    pub review_updates: bool,
}

impl Preferences {
    /// Whether the given channel is enabled.
    pub fn channel_enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::Sms => self.sms,
            Channel::Push => self.push,
            Channel::Websocket => self.websocket,
            Channel::Email => self.email,
        }
    }

    /// Whether the given event category is enabled.
    pub fn category_enabled(&self, category: EventCategory) -> bool {
        match category {
            EventCategory::Booking => self.booking_updates,
            EventCategory::Payment => self.payment_updates,
            EventCategory::Review => self.review_updates,
        }
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sms: true,
            push: true,
            websocket: true,
            email: true,
            quiet_hours: None,
            booking_updates: true,
            payment_updates: true,
            review_updates: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn quiet_hours_same_day_window() {
        let qh = QuietHours {
            start: "13:00".to_string(),
            end: "15:00".to_string(),
        };
        assert!(qh.contains(t(13, 0)));
        assert!(qh.contains(t(14, 30)));
        assert!(!qh.contains(t(15, 0)));
        assert!(!qh.contains(t(12, 59)));
    }

    #[test]
    fn quiet_hours_overnight_wrap() {
        let qh = QuietHours {
            start: "22:00".to_string(),
            end: "08:00".to_string(),
        };
        assert!(qh.contains(t(23, 0)));
        assert!(qh.contains(t(3, 0)));
        assert!(qh.contains(t(22, 0)));
        assert!(!qh.contains(t(8, 0)));
        assert!(!qh.contains(t(12, 0)));
    }

    #[test]
    fn quiet_hours_malformed_disables_window() {
        let qh = QuietHours {
            start: "late".to_string(),
            end: "08:00".to_string(),
        };
        assert!(!qh.contains(t(23, 0)));
    }

    #[test]
    fn partial_preferences_json_fills_defaults() {
        let prefs: Preferences = serde_json::from_str(r#"{"sms": false}"#).unwrap();
        assert!(!prefs.channel_enabled(Channel::Sms));
        assert!(prefs.channel_enabled(Channel::Push));
        assert!(prefs.category_enabled(EventCategory::Payment));
        assert!(prefs.quiet_hours.is_none());
    }
}
