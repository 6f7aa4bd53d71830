//! Classification of raw presence events into session lifecycle transitions.

use crate::event::PresenceUpdate;
use crate::types::{ChannelId, MemberId};

/// A classified session lifecycle transition for the watched channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The member entered the watched channel from no channel.
    Enter { member: MemberId },
    /// The member left the watched channel to no channel.
    Leave { member: MemberId },
    /// The event is irrelevant to session accounting.
    Ignore,
}

/// Classifies a raw presence event relative to the watched channel.
///
/// Pure function: no side effects, same inputs always yield the same outcome.
/// Every input combination maps to a defined transition; malformed events
/// (empty member ID) classify as [`Transition::Ignore`] rather than erroring.
///
/// Only transitions to/from *no* channel count as Enter/Leave. A member who
/// moves from the watched channel directly into another channel is ignored,
/// matching the notifier's historical behavior (whether such a move should
/// end the session is an open question, so the behavior is kept as-is). The
/// stale session such a move leaves behind is discarded by the
/// overwrite-on-enter rule in
/// [`SessionStore::on_enter`](crate::SessionStore::on_enter).
#[must_use]
pub fn classify(update: &PresenceUpdate, watched: &ChannelId) -> Transition {
    let Ok(member) = MemberId::new(update.member_id.clone()) else {
        tracing::debug!("presence event without member ID ignored");
        return Transition::Ignore;
    };

    let previous = update.previous_channel_id.as_deref();
    let new = update.new_channel_id.as_deref();
    let watched = watched.as_str();

    // Neither side of the transition touches the watched channel.
    if previous != Some(watched) && new != Some(watched) {
        return Transition::Ignore;
    }

    match (previous, new) {
        (None, Some(channel)) if channel == watched => Transition::Enter { member },
        (Some(channel), None) if channel == watched => Transition::Leave { member },
        // Same channel on both sides: an attribute toggle (mute, deafen)
        // rotated the session token without a location change.
        //
        // Everything else (watched -> other channel, other channel -> watched)
        // is also ignored for duration accounting.
        _ => Transition::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATCHED: &str = "voice-watched";

    fn update(previous: Option<&str>, new: Option<&str>) -> PresenceUpdate {
        PresenceUpdate {
            member_id: "user-1".into(),
            previous_channel_id: previous.map(String::from),
            new_channel_id: new.map(String::from),
            session_token: Some("tok-1".into()),
            display_name: "Alice".into(),
            avatar_url: None,
        }
    }

    fn watched() -> ChannelId {
        ChannelId::new(WATCHED).unwrap()
    }

    #[test]
    fn unrelated_channels_always_ignore() {
        let cases = [
            (None, None),
            (None, Some("voice-other")),
            (Some("voice-other"), None),
            (Some("voice-other"), Some("voice-third")),
        ];
        for (previous, new) in cases {
            assert_eq!(
                classify(&update(previous, new), &watched()),
                Transition::Ignore,
                "previous={previous:?} new={new:?}"
            );
        }
    }

    #[test]
    fn joining_from_nowhere_is_enter() {
        let transition = classify(&update(None, Some(WATCHED)), &watched());
        assert_eq!(
            transition,
            Transition::Enter {
                member: MemberId::new("user-1").unwrap()
            }
        );
    }

    #[test]
    fn disconnecting_from_watched_is_leave() {
        let transition = classify(&update(Some(WATCHED), None), &watched());
        assert_eq!(
            transition,
            Transition::Leave {
                member: MemberId::new("user-1").unwrap()
            }
        );
    }

    #[test]
    fn attribute_only_change_is_ignored() {
        // Mute/deafen toggles keep the channel but rotate the session token.
        let transition = classify(&update(Some(WATCHED), Some(WATCHED)), &watched());
        assert_eq!(transition, Transition::Ignore);
    }

    #[test]
    fn move_to_another_channel_is_ignored() {
        // Historical behavior: only transitions to/from no channel count.
        assert_eq!(
            classify(&update(Some(WATCHED), Some("voice-other")), &watched()),
            Transition::Ignore
        );
        assert_eq!(
            classify(&update(Some("voice-other"), Some(WATCHED)), &watched()),
            Transition::Ignore
        );
    }

    #[test]
    fn missing_member_id_is_ignored_not_an_error() {
        let mut malformed = update(None, Some(WATCHED));
        malformed.member_id = String::new();
        assert_eq!(classify(&malformed, &watched()), Transition::Ignore);
    }
}
