//! Backoff policy for failed deliveries.

use chrono::{DateTime, Duration, Utc};

use lamsa_core::config::RetryConfig;
use lamsa_entity::notification::DeliveryRecord;

/// Decides whether a failed row is due for another attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: i32,
    delays: Vec<Duration>,
    exponential: bool,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delays: config
                .delays_seconds
                .iter()
                .map(|s| Duration::seconds(*s as i64))
                .collect(),
            exponential: config.exponential,
            base_delay: Duration::seconds(config.base_delay_seconds as i64),
        }
    }

    pub fn max_attempts(&self) -> i32 {
        self.max_attempts
    }

    /// Minimum wait after the last attempt, given how many attempts have
    /// already been made.
    ///
    /// Table mode indexes `delays` by the attempt count and clamps to
    /// the last entry; exponential mode doubles the base delay per
    /// attempt.
    pub fn required_delay(&self, attempts: i32) -> Duration {
        let attempts = attempts.max(0) as usize;
        if self.exponential {
            let factor = 2i64.saturating_pow(attempts.min(16) as u32);
            self.base_delay * factor as i32
        } else if self.delays.is_empty() {
            self.base_delay
        } else {
            self.delays[attempts.min(self.delays.len() - 1)]
        }
    }

    /// Whether this row has waited out its backoff as of `now`.
    ///
    /// Rows with no recorded attempt time are eligible immediately.
    pub fn is_eligible(&self, record: &DeliveryRecord, now: DateTime<Utc>) -> bool {
        if record.attempts >= self.max_attempts {
            return false;
        }
        match record.last_attempt_at {
            Some(last) => now - last >= self.required_delay(record.attempts),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamsa_entity::notification::{
        Channel, DeliveryState, NotificationEvent, Priority,
    };
    use uuid::Uuid;

    fn failed_row(attempts: i32, last_attempt_secs_ago: i64) -> DeliveryRecord {
        let now = Utc::now();
        DeliveryRecord {
            id: Uuid::new_v4(),
            notification_id: Uuid::new_v4(),
            channel: Channel::Sms,
            event: NotificationEvent::BookingConfirmed,
            priority: Priority::Normal,
            status: DeliveryState::Failed,
            attempts,
            recipient_id: Uuid::new_v4(),
            title: "t".into(),
            body: "b".into(),
            last_attempt_at: Some(now - Duration::seconds(last_attempt_secs_ago)),
            delivered_at: None,
            failure_reason: Some("TIMEOUT".into()),
            external_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn policy(delays: &[u64]) -> RetryPolicy {
        RetryPolicy::from_config(&RetryConfig {
            delays_seconds: delays.to_vec(),
            ..RetryConfig::default()
        })
    }

    #[test]
    fn backoff_gates_until_delay_elapses() {
        let policy = policy(&[10, 15, 300]);
        // attempts=1 requires delays[1] = 15s since the last attempt.
        assert!(!policy.is_eligible(&failed_row(1, 2), Utc::now()));
        assert!(policy.is_eligible(&failed_row(1, 15), Utc::now()));
    }

    #[test]
    fn attempts_past_table_use_last_entry() {
        let policy = policy(&[10, 15]);
        assert_eq!(policy.required_delay(5), Duration::seconds(15));
    }

    #[test]
    fn exhausted_rows_are_never_eligible() {
        let policy = policy(&[1]);
        assert!(!policy.is_eligible(&failed_row(3, 10_000), Utc::now()));
    }

    #[test]
    fn exponential_mode_doubles_per_attempt() {
        let policy = RetryPolicy::from_config(&RetryConfig {
            exponential: true,
            base_delay_seconds: 15,
            ..RetryConfig::default()
        });
        assert_eq!(policy.required_delay(0), Duration::seconds(15));
        assert_eq!(policy.required_delay(1), Duration::seconds(30));
        assert_eq!(policy.required_delay(2), Duration::seconds(60));
    }
}
