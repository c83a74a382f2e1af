//! Background tasks: the failed-delivery retry scheduler and the
//! stale-pending expiry sweep.

pub mod retry;
pub mod scheduler;
pub mod sweeper;

pub use retry::RetryPolicy;
pub use scheduler::{RetryScheduler, TickStats};
pub use sweeper::ExpirySweeper;
