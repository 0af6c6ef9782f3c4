use std::fmt;

use serde::Deserialize;

use crate::model::id::{ChannelId, GuildId};
use crate::model::track::TrackInfo;

/// Repeat mode of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    #[default]
    #[serde(alias = "none")]
    Off,
    Track,
    Queue
}

impl LoopMode {
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Off => "⏺️",
            Self::Track => "🔂",
            Self::Queue => "🔁"
        }
    }
}

impl fmt::Display for LoopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::Track => "track",
            Self::Queue => "queue"
        })
    }
}

/// View of an engine player carried by every lifecycle event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHandle {
    pub guild_id: GuildId,
    pub voice_channel_id: Option<ChannelId>,
    #[serde(default)]
    pub playing: bool,
    #[serde(default)]
    pub paused: bool,
    #[serde(default = "default_volume")]
    pub volume: u16,
    #[serde(default)]
    pub loop_mode: LoopMode,
    #[serde(default)]
    pub queue_len: usize,
    pub current: Option<TrackInfo>
}

fn default_volume() -> u16 {
    50
}

impl SessionHandle {
    pub fn new(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            voice_channel_id: None,
            playing: false,
            paused: false,
            volume: default_volume(),
            loop_mode: LoopMode::Off,
            queue_len: 0,
            current: None
        }
    }
}
