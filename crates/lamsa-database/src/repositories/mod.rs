//! sqlx repository implementations.

pub mod delivery;
pub mod recipient;
