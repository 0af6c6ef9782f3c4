//! Advertises the current track on a voice channel through the first method
//! that works: the native status field, the topic, then the name.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::error::SyncResult;
use crate::model::id::{ChannelId, GuildId};
use crate::model::view::VoiceDisplayText;
use crate::platform::{Capability, ChatPlatform};
use crate::render::DISPLAY_MARKER;

/// Longest name the platform accepts for a channel.
const MAX_NAME_LEN: usize = 100;

/// Name and topic of a voice channel before the first write to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalMetadata {
    pub guild: Option<GuildId>,
    pub name: String,
    pub topic: Option<String>
}

/// Which method ended up carrying the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMethod {
    Status,
    Topic,
    Name
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The bot can't manage the channel, nothing was attempted.
    Skipped,
    Written(WriteMethod),
    /// Every method failed.
    Failed
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearOutcome {
    pub skipped: bool,
    pub status_cleared: bool,
    pub topic_restored: bool,
    pub name_restored: bool
}

pub struct VoiceDisplayWriter {
    platform: Arc<dyn ChatPlatform>,
    originals: DashMap<ChannelId, OriginalMetadata>
}

impl VoiceDisplayWriter {
    pub fn new(platform: Arc<dyn ChatPlatform>) -> Self {
        Self {
            platform,
            originals: DashMap::new()
        }
    }

    pub fn original(&self, channel: ChannelId) -> Option<OriginalMetadata> {
        self.originals.get(&channel).map(|o| o.value().clone())
    }

    pub async fn write(&self, guild: GuildId, channel: ChannelId, text: &VoiceDisplayText) -> SyncResult<WriteOutcome> {
        if !self.can_manage(guild, channel).await {
            return Ok(WriteOutcome::Skipped);
        }

        if !self.originals.contains_key(&channel) {
            let info = self.platform.fetch_channel(channel).await?;

            self.originals.entry(channel).or_insert(OriginalMetadata {
                guild: info.guild_id.or(Some(guild)),
                name: info.name,
                topic: info.topic
            });
        }

        match self.platform.put_voice_status(channel, Some(&text.status)).await {
            Ok(()) => {
                info!("Voice status of {channel} set to {}", text.status);
                return Ok(WriteOutcome::Written(WriteMethod::Status));
            },
            Err(e) => debug!("Voice status unavailable for {channel}: {e}")
        }

        match self.platform.set_channel_topic(channel, Some(&text.topic)).await {
            Ok(()) => {
                info!("Topic of {channel} set to {}", text.topic);
                return Ok(WriteOutcome::Written(WriteMethod::Topic));
            },
            Err(e) => debug!("Setting topic of {channel} failed: {e}")
        }

        if text.name.chars().count() > MAX_NAME_LEN {
            warn!("Name {} is too long for {channel}", text.name);
            return Ok(WriteOutcome::Failed);
        }

        let current = self.platform.fetch_channel(channel).await?;

        if current.name == text.name {
            return Ok(WriteOutcome::Written(WriteMethod::Name));
        }

        match self.platform.set_channel_name(channel, &text.name).await {
            Ok(()) => {
                info!("Name of {channel} set to {}", text.name);
                Ok(WriteOutcome::Written(WriteMethod::Name))
            },
            Err(e) => {
                warn!("Setting name of {channel} failed: {e}");
                Ok(WriteOutcome::Failed)
            }
        }
    }

    /// Removes the display and restores the channel's original name and topic.
    ///
    /// Every step runs regardless of which method the last write used, so
    /// clearing works even if the available methods changed in between.
    pub async fn clear(&self, guild: GuildId, channel: ChannelId) -> SyncResult<ClearOutcome> {
        if !self.can_manage(guild, channel).await {
            return Ok(ClearOutcome {
                skipped: true,
                ..Default::default()
            });
        }

        let current = match self.platform.fetch_channel(channel).await {
            Ok(info) => info,
            Err(e) => {
                if e.disables_surface() {
                    self.originals.remove(&channel);
                }
                return Err(e.into());
            }
        };

        let original = self.original(channel);
        let mut outcome = ClearOutcome::default();

        outcome.status_cleared = match self.platform.put_voice_status(channel, None).await {
            Ok(()) => true,
            Err(_) => match self.platform.delete_voice_status(channel).await {
                Ok(()) => true,
                Err(e) => {
                    debug!("Voice status unavailable for clearing {channel}: {e}");
                    false
                }
            }
        };

        // Without a cached original only a leftover display is removed.
        let topic = match original.as_ref() {
            Some(o) => o.topic.clone(),
            None if is_leftover(current.topic.as_deref()) => None,
            None => current.topic.clone()
        };

        outcome.topic_restored = if current.topic == topic {
            true
        } else {
            match self.platform.set_channel_topic(channel, topic.as_deref()).await {
                Ok(()) => true,
                Err(e) => {
                    debug!("Restoring topic of {channel} failed: {e}");
                    false
                }
            }
        };

        outcome.name_restored = match original.as_ref() {
            None => true,
            Some(o) if o.name == current.name => true,
            Some(o) => match self.platform.set_channel_name(channel, &o.name).await {
                Ok(()) => {
                    info!("Name of {channel} restored to {}", o.name);
                    true
                },
                Err(e) => {
                    warn!("Restoring name of {channel} failed: {e}");
                    false
                }
            }
        };

        if outcome.topic_restored && outcome.name_restored {
            self.originals.remove(&channel);
        }

        Ok(outcome)
    }

    /// Picks the voice channel of a guild: the session's channel, the one the
    /// bot is connected to, or any channel of the guild that was written to.
    pub async fn resolve_channel(&self, guild: GuildId, session_channel: Option<ChannelId>) -> Option<ChannelId> {
        if session_channel.is_some() {
            return session_channel;
        }

        if let Some(channel) = self.platform.current_voice_channel(guild).await {
            return Some(channel);
        }

        self.originals.iter()
            .find(|o| o.guild == Some(guild))
            .map(|o| *o.key())
    }

    /// Guilds with at least one channel that still has to be restored.
    pub fn touched_guilds(&self) -> Vec<GuildId> {
        let mut guilds = self.originals.iter()
            .filter_map(|o| o.guild)
            .collect::<Vec<_>>();

        guilds.sort();
        guilds.dedup();
        guilds
    }

    async fn can_manage(&self, guild: GuildId, channel: ChannelId) -> bool {
        let allowed = self.platform
            .has_permissions(guild, channel, &[Capability::ManageChannels])
            .await;

        if !allowed {
            warn!("Missing channel management permission on {channel} in guild {guild}");
        }

        allowed
    }
}

fn is_leftover(topic: Option<&str>) -> bool {
    topic.is_some_and(|t| t.starts_with(DISPLAY_MARKER))
}
