//! Notification event types and categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle events that trigger a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_event", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    /// A customer created a booking; notifies the provider.
    BookingCreated,
    /// A provider confirmed a booking; notifies the customer.
    BookingConfirmed,
    /// Either party cancelled a booking.
    BookingCancelled,
    /// Upcoming-appointment reminder.
    BookingReminder,
    /// The appointment was completed.
    BookingCompleted,
    /// A payment settled successfully.
    PaymentReceived,
    /// A payment attempt failed.
    PaymentFailed,
    /// A new review was left for the provider.
    ReviewReceived,
    /// Reminder asking the customer to review a completed booking.
    ReviewReminder,
}

/// Coarse event grouping used by per-category preference flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Booking,
    Payment,
    Review,
}

impl NotificationEvent {
    /// Return the event as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BookingCreated => "booking_created",
            Self::BookingConfirmed => "booking_confirmed",
            Self::BookingCancelled => "booking_cancelled",
            Self::BookingReminder => "booking_reminder",
            Self::BookingCompleted => "booking_completed",
            Self::PaymentReceived => "payment_received",
            Self::PaymentFailed => "payment_failed",
            Self::ReviewReceived => "review_received",
            Self::ReviewReminder => "review_reminder",
        }
    }

    /// The preference category this event belongs to.
    pub fn category(&self) -> EventCategory {
        match self {
            Self::BookingCreated
            | Self::BookingConfirmed
            | Self::BookingCancelled
            | Self::BookingReminder
            | Self::BookingCompleted => EventCategory::Booking,
            Self::PaymentReceived | Self::PaymentFailed => EventCategory::Payment,
            Self::ReviewReceived | Self::ReviewReminder => EventCategory::Review,
        }
    }
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
