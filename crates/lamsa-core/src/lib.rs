//! # lamsa-core
//!
//! Shared foundation for the Lamsa notification platform: the unified
//! [`error::AppError`] type, the [`result::AppResult`] alias, and the
//! configuration schemas loaded from TOML + environment.

pub mod config;
pub mod error;
pub mod result;
