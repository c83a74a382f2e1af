//! In-process WebSocket connection registry.
//!
//! Tracks live client connections by recipient so the websocket channel
//! can push notifications directly, and the dispatcher can check
//! presence before attempting it.

pub mod handle;
pub mod message;
pub mod registry;

pub use handle::{ConnectionHandle, ConnectionId};
pub use message::{InboundMessage, OutboundMessage};
pub use registry::ConnectionRegistry;
