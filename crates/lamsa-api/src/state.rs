//! Shared application state.

use std::sync::Arc;

use lamsa_core::config::AppConfig;
use lamsa_database::store::{DeliveryStore, RecipientDirectory};
use lamsa_dispatch::NotificationDispatcher;
use lamsa_realtime::ConnectionRegistry;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub store: Arc<dyn DeliveryStore>,
    pub directory: Arc<dyn RecipientDirectory>,
    pub registry: Arc<ConnectionRegistry>,
}
