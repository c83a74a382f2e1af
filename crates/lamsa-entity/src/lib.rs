//! # lamsa-entity
//!
//! Domain models shared across the Lamsa notification platform:
//! channels, events, recipients, preferences, delivery records, and
//! templates.

pub mod notification;
