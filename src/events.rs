use serde::Deserialize;

use crate::error::{SyncError, SyncResult};
use crate::model::id::GuildId;
use crate::model::player::SessionHandle;

/// Playback lifecycle events raised by the audio engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// A track started playing.
    TrackStart(SessionHandle),
    /// A track finished, more tracks may follow.
    TrackEnd(SessionHandle),
    /// The last track of the queue finished.
    QueueEnd(SessionHandle),
    PlayerCreate(SessionHandle),
    /// The player left voice or was destroyed.
    PlayerDisconnect(SessionHandle),
    /// An audio node reported an error.
    NodeError {
        node: String,
        error: String
    },
    /// An audio node went away, taking its players with it.
    NodeDisconnect {
        node: String
    }
}

impl LifecycleEvent {
    /// Parses an event as sent by the engine integration.
    pub fn from_json(raw: &str) -> SyncResult<Self> {
        serde_json::from_str(raw).map_err(|e| SyncError::Malformed(e.to_string()))
    }

    /// The guild whose session the event belongs to.
    pub fn guild(&self) -> Option<GuildId> {
        match self {
            Self::TrackStart(s)
            | Self::TrackEnd(s)
            | Self::QueueEnd(s)
            | Self::PlayerCreate(s)
            | Self::PlayerDisconnect(s) => Some(s.guild_id),
            Self::NodeError { .. } | Self::NodeDisconnect { .. } => None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TrackStart(_) => "track_start",
            Self::TrackEnd(_) => "track_end",
            Self::QueueEnd(_) => "queue_end",
            Self::PlayerCreate(_) => "player_create",
            Self::PlayerDisconnect(_) => "player_disconnect",
            Self::NodeError { .. } => "node_error",
            Self::NodeDisconnect { .. } => "node_disconnect"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_tagged_events() {
        let event: LifecycleEvent = serde_json::from_value(serde_json::json!({
            "type": "queue_end",
            "data": {
                "guildId": "5",
                "voiceChannelId": "6",
                "paused": false,
                "loopMode": "none",
                "queueLen": 0,
                "current": null
            }
        })).unwrap();

        assert_eq!(event.name(), "queue_end");
        assert_eq!(event.guild(), GuildId::new(5));

        let event: LifecycleEvent = serde_json::from_value(serde_json::json!({
            "type": "node_disconnect",
            "data": { "node": "main" }
        })).unwrap();

        assert_eq!(event.guild(), None);
    }

    #[test]
    fn rejects_unknown_events() {
        let err = LifecycleEvent::from_json(r#"{"type":"track_stuck","data":{}}"#).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::MalformedInput);

        let event = LifecycleEvent::from_json(r#"{"type":"node_error","data":{"node":"main","error":"oom"}}"#).unwrap();
        assert_eq!(event.name(), "node_error");
    }
}
