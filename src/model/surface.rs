use serde::{Deserialize, Serialize};

use crate::model::id::{ChannelId, MessageId};

/// The status surface stored for a guild (`centralSetup` in the bot's storage).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusSurface {
    pub enabled: bool,
    #[serde(rename = "embedId")]
    pub embed_message_id: Option<MessageId>,
    #[serde(rename = "channelId")]
    pub embed_channel_id: Option<ChannelId>,
    #[serde(rename = "vcChannelId")]
    pub voice_channel_id: Option<ChannelId>
}

impl StatusSurface {
    /// The message the status embed lives in, if one was published.
    pub fn embed(&self) -> Option<(ChannelId, MessageId)> {
        Some((self.embed_channel_id?, self.embed_message_id?))
    }
}

/// Per-guild configuration consulted by the core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildRecord {
    #[serde(rename = "centralSetup", default)]
    pub surface: StatusSurface,
    #[serde(default)]
    pub autoplay: bool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_stored_record() {
        let record: GuildRecord = serde_json::from_value(serde_json::json!({
            "centralSetup": {
                "enabled": true,
                "embedId": "11",
                "channelId": "22",
                "vcChannelId": null
            },
            "autoplay": false
        })).unwrap();

        assert!(record.surface.enabled);
        assert_eq!(record.surface.embed(), Some((ChannelId::new(22).unwrap(), MessageId::new(11).unwrap())));
        assert_eq!(record.surface.voice_channel_id, None);
    }
}
