//! Quiet-hours evaluation.

use chrono::{DateTime, FixedOffset, Offset, Utc};

use lamsa_entity::notification::Recipient;

/// Whether `now` falls inside the recipient's quiet-hours window.
///
/// Windows are wall-clock times in the market's local timezone, given
/// as a fixed offset from UTC in minutes. Recipients without a
/// configured window are never in quiet hours.
pub fn is_in_quiet_hours(
    recipient: &Recipient,
    now: DateTime<Utc>,
    utc_offset_minutes: i32,
) -> bool {
    let Some(window) = recipient
        .preferences
        .as_ref()
        .and_then(|p| p.quiet_hours.as_ref())
    else {
        return false;
    };

    // A nonsense offset (beyond +/-24h) falls back to UTC.
    let offset = FixedOffset::east_opt(utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix());
    let local = now.with_timezone(&offset).time();
    window.contains(local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lamsa_entity::notification::{Preferences, QuietHours, RecipientKind};
    use uuid::Uuid;

    fn recipient_with_window(start: &str, end: &str) -> Recipient {
        let mut r = Recipient::new(Uuid::new_v4(), RecipientKind::Customer);
        r.preferences = Some(Preferences {
            quiet_hours: Some(QuietHours {
                start: start.to_owned(),
                end: end.to_owned(),
            }),
            ..Preferences::default()
        });
        r
    }

    #[test]
    fn overnight_window_in_local_time() {
        let r = recipient_with_window("22:00", "08:00");
        // 23:00 Amman time is 20:00 UTC.
        let utc = Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap();
        assert!(is_in_quiet_hours(&r, utc, 180));
        // 12:00 Amman time is outside.
        let noon = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        assert!(!is_in_quiet_hours(&r, noon, 180));
    }

    #[test]
    fn no_preferences_means_never_quiet() {
        let r = Recipient::new(Uuid::new_v4(), RecipientKind::Customer);
        let utc = Utc.with_ymd_and_hms(2025, 6, 1, 23, 30, 0).unwrap();
        assert!(!is_in_quiet_hours(&r, utc, 180));
    }
}
