//! Retry scheduler configuration.

use serde::{Deserialize, Serialize};

/// Retry scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Whether the retry scheduler runs.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between scheduler ticks.
    #[serde(default = "default_tick")]
    pub tick_interval_seconds: u64,
    /// Maximum delivery attempts per (notification, channel) before the
    /// row is left in its terminal `failed` state.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,
    /// Backoff delay table in seconds, indexed by attempts already made.
    ///
    /// Rows with more attempts than the table covers use the last entry.
    #[serde(default = "default_delays")]
    pub delays_seconds: Vec<u64>,
    /// Use exponential backoff (`base_delay * 2^attempts`) instead of
    /// the delay table.
    #[serde(default)]
    pub exponential: bool,
    /// Base delay in seconds for exponential mode.
    #[serde(default = "default_base_delay")]
    pub base_delay_seconds: u64,
    /// Maximum rows fetched per tick.
    #[serde(default = "default_batch")]
    pub batch_size: i64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_interval_seconds: default_tick(),
            max_attempts: default_max_attempts(),
            delays_seconds: default_delays(),
            exponential: false,
            base_delay_seconds: default_base_delay(),
            batch_size: default_batch(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_tick() -> u64 {
    300
}

fn default_max_attempts() -> i32 {
    3
}

fn default_delays() -> Vec<u64> {
    vec![15, 60, 300]
}

fn default_base_delay() -> u64 {
    15
}

fn default_batch() -> i64 {
    200
}
