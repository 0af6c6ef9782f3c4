//! Collaborators the core talks to: the chat platform, the audio engine and
//! the per-guild configuration storage.

use async_trait::async_trait;

use crate::error::{PlatformError, StoreError};
use crate::model::id::{ChannelId, GuildId, MessageId};
use crate::model::player::SessionHandle;
use crate::model::surface::GuildRecord;
use crate::model::view::{EmbedPayload, PresenceView};

/// Capabilities the core may require on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ManageChannels,
    SendMessages,
    EmbedLinks
}

/// The parts of a channel the core reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub name: String,
    pub topic: Option<String>
}

#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Whether the bot is still a member of the guild.
    async fn guild_available(&self, guild: GuildId) -> bool;
    /// Every guild the bot is currently in.
    async fn guilds(&self) -> Vec<GuildId>;
    async fn fetch_channel(&self, channel: ChannelId) -> Result<ChannelInfo, PlatformError>;
    async fn message_exists(&self, channel: ChannelId, message: MessageId) -> Result<bool, PlatformError>;
    async fn send_embed(&self, channel: ChannelId, payload: &EmbedPayload) -> Result<MessageId, PlatformError>;
    async fn edit_embed(
        &self,
        channel: ChannelId,
        message: MessageId,
        payload: &EmbedPayload
    ) -> Result<(), PlatformError>;
    async fn set_presence(&self, presence: &PresenceView) -> Result<(), PlatformError>;
    async fn set_channel_name(&self, channel: ChannelId, name: &str) -> Result<(), PlatformError>;
    /// Sets or removes (`None`) the topic of a channel.
    async fn set_channel_topic(&self, channel: ChannelId, topic: Option<&str>) -> Result<(), PlatformError>;
    /// Writes the native voice status field, `None` clears it.
    async fn put_voice_status(&self, channel: ChannelId, status: Option<&str>) -> Result<(), PlatformError>;
    async fn delete_voice_status(&self, channel: ChannelId) -> Result<(), PlatformError>;
    /// Permissions that can't be determined count as missing.
    async fn has_permissions(&self, guild: GuildId, channel: ChannelId, required: &[Capability]) -> bool;
    /// The voice channel the bot is connected to in the guild, if any.
    async fn current_voice_channel(&self, guild: GuildId) -> Option<ChannelId>;
}

#[async_trait]
pub trait AudioEngine: Send + Sync {
    async fn session(&self, guild: GuildId) -> Option<SessionHandle>;
    /// Asks the engine to pick the next track on its own.
    async fn start_autoplay(&self, guild: GuildId);
    async fn destroy(&self, guild: GuildId);
}

#[async_trait]
pub trait SurfaceStore: Send + Sync {
    async fn get(&self, guild: GuildId) -> Result<Option<GuildRecord>, StoreError>;
    /// Guilds with an enabled surface and a recorded message.
    async fn list_enabled(&self) -> Result<Vec<(GuildId, GuildRecord)>, StoreError>;
    async fn set_embed(&self, guild: GuildId, channel: ChannelId, message: MessageId) -> Result<(), StoreError>;
    /// Marks the surface disabled and forgets its message.
    async fn disable(&self, guild: GuildId) -> Result<(), StoreError>;
}
