//! HTTP handlers.

pub mod health;
pub mod notification;
pub mod recipient;
pub mod ws;
