//! Notification dispatch: template selection, rendering, channel
//! fallback, and delivery tracking.

pub mod dispatcher;
pub mod preferences;
pub mod quiet;
pub mod templates;

pub use dispatcher::{DispatchResult, NotificationDispatcher};
pub use templates::catalog::TemplateCatalog;
