//! Raw presence-change events from the gateway.

use serde::{Deserialize, Serialize};

/// A raw voice-state change delivered by the gateway for any member and any
/// channel. The classifier is responsible for filtering down to the watched
/// channel.
///
/// `member_id` is kept as a plain string on purpose: a malformed event with an
/// empty member ID must classify as [`Transition::Ignore`] rather than fail
/// deserialization.
///
/// [`Transition::Ignore`]: crate::Transition::Ignore
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceUpdate {
    /// Opaque stable identifier of the member.
    pub member_id: String,
    /// Channel the member was in before the change, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_channel_id: Option<String>,
    /// Channel the member is in after the change, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_channel_id: Option<String>,
    /// Opaque voice-session token. Changes on attribute toggles (mute,
    /// deafen) without a channel change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    /// Display name for notification rendering.
    #[serde(default)]
    pub display_name: String,
    /// Avatar URL for notification rendering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_update_roundtrip() {
        let update = PresenceUpdate {
            member_id: "user-1".into(),
            previous_channel_id: None,
            new_channel_id: Some("voice-1".into()),
            session_token: Some("tok-a".into()),
            display_name: "Alice".into(),
            avatar_url: None,
        };

        let json = serde_json::to_string(&update).unwrap();
        let parsed: PresenceUpdate = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.member_id, update.member_id);
        assert_eq!(parsed.new_channel_id, update.new_channel_id);
    }

    #[test]
    fn presence_update_tolerates_missing_optionals() {
        let json = r#"{"member_id": "user-2"}"#;
        let parsed: PresenceUpdate = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.member_id, "user-2");
        assert!(parsed.previous_channel_id.is_none());
        assert!(parsed.new_channel_id.is_none());
        assert!(parsed.display_name.is_empty());
    }
}
