//! Template catalog and rendering.

pub mod catalog;
pub mod render;
