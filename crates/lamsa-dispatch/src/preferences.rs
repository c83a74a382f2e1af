//! Preference filtering.

use lamsa_entity::notification::{Channel, NotificationEvent, Recipient};

/// Filter requested channels by the recipient's preferences.
///
/// Fails open: a recipient with no preferences object gets every
/// requested channel, since most accounts never configure preferences.
/// A configured recipient loses channels they disabled, and loses all
/// channels when the event's whole category is muted.
pub fn filter_channels(
    recipient: &Recipient,
    event: NotificationEvent,
    requested: &[Channel],
) -> Vec<Channel> {
    let Some(prefs) = recipient.preferences.as_ref() else {
        return requested.to_vec();
    };

    if !prefs.category_enabled(event.category()) {
        return Vec::new();
    }

    requested
        .iter()
        .copied()
        .filter(|channel| prefs.channel_enabled(*channel))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamsa_entity::notification::{Preferences, RecipientKind};
    use uuid::Uuid;

    #[test]
    fn no_preferences_allows_everything() {
        let r = Recipient::new(Uuid::new_v4(), RecipientKind::Customer);
        let requested = [Channel::Sms, Channel::Push, Channel::Websocket];
        assert_eq!(
            filter_channels(&r, NotificationEvent::BookingConfirmed, &requested),
            requested.to_vec()
        );
    }

    #[test]
    fn disabled_channel_is_dropped() {
        let mut r = Recipient::new(Uuid::new_v4(), RecipientKind::Customer);
        r.preferences = Some(Preferences {
            sms: false,
            ..Preferences::default()
        });
        assert_eq!(
            filter_channels(
                &r,
                NotificationEvent::BookingConfirmed,
                &[Channel::Sms, Channel::Push]
            ),
            vec![Channel::Push]
        );
    }

    #[test]
    fn muted_category_drops_all_channels() {
        let mut r = Recipient::new(Uuid::new_v4(), RecipientKind::Provider);
        r.preferences = Some(Preferences {
            review_updates: false,
            ..Preferences::default()
        });
        assert!(filter_channels(
            &r,
            NotificationEvent::ReviewReceived,
            &[Channel::Sms, Channel::Push]
        )
        .is_empty());
    }
}
