//! # lamsa-database
//!
//! Persistence layer for the Lamsa notification platform: the PostgreSQL
//! connection pool, the [`store::DeliveryStore`] and
//! [`store::RecipientDirectory`] trait seams, their sqlx implementations,
//! and in-memory implementations for tests and standalone runs.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;
