//! Notification domain models.

pub mod channel;
pub mod delivery;
pub mod event;
pub mod preference;
pub mod priority;
pub mod recipient;
pub mod request;
pub mod template;

pub use channel::Channel;
pub use delivery::{DeliveryRecord, DeliveryState, DeliveryStats};
pub use event::{EventCategory, NotificationEvent};
pub use preference::{Preferences, QuietHours};
pub use priority::Priority;
pub use recipient::{Language, Recipient, RecipientKind};
pub use request::NotificationRequest;
pub use template::{LocalizedText, RenderedMessage, Template};
