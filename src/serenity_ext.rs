//! [`ChatPlatform`] backed by a serenity client.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{
    ActivityData, ButtonStyle as SerenityButtonStyle, Cache, Client, Context, CreateActionRow, CreateButton,
    CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, CreateMessage, EditChannel, EditMessage, Http,
    OnlineStatus, Permissions, ReactionType, ShardManager, Timestamp
};
use serenity::http::HttpError;
use tracing::{debug, warn};
use typemap_rev::TypeMapKey;

use crate::config::Config;
use crate::error::PlatformError;
use crate::model::error::ErrorResponse;
use crate::model::id::{ChannelId, GuildId, MessageId};
use crate::model::view::{ActivityKind, Button, ButtonStyle, EmbedPayload, PresenceView};
use crate::platform::{Capability, ChannelInfo, ChatPlatform};
use crate::rest::RestClient;
use crate::StatusSync;

pub struct StatusSyncKey;

impl TypeMapKey for StatusSyncKey {
    type Value = Arc<StatusSync>;
}

#[async_trait]
pub trait SerenityExt {
    /// Stores the instance into the client's typemap, see [`status_sync`].
    async fn register_status_sync(&self, sync: Arc<StatusSync>);
}

#[async_trait]
impl SerenityExt for Client {
    async fn register_status_sync(&self, sync: Arc<StatusSync>) {
        self.data.write().await.insert::<StatusSyncKey>(sync);
    }
}

/// Retrieves the instance registered with [`SerenityExt::register_status_sync`].
pub async fn status_sync(ctx: &Context) -> Option<Arc<StatusSync>> {
    ctx.data.read().await.get::<StatusSyncKey>().cloned()
}

pub struct SerenityPlatform {
    http: Arc<Http>,
    cache: Arc<Cache>,
    shards: Arc<ShardManager>,
    rest: RestClient
}

impl SerenityPlatform {
    pub fn from_client(client: &Client, config: &Config) -> Self {
        Self {
            http: Arc::clone(&client.http),
            cache: Arc::clone(&client.cache),
            shards: Arc::clone(&client.shard_manager),
            rest: RestClient::new(config)
        }
    }

    fn cache_http(&self) -> (&Arc<Cache>, &Http) {
        (&self.cache, self.http.as_ref())
    }

    fn build_embed(&self, payload: &EmbedPayload) -> CreateEmbed {
        let view = &payload.embed;

        let mut author = CreateEmbedAuthor::new(&view.author.name);
        if let Some(icon) = &view.author.icon_url {
            author = author.icon_url(icon);
        }
        if let Some(url) = &view.author.url {
            author = author.url(url);
        }

        let footer = CreateEmbedFooter::new(&view.footer)
            .icon_url(self.cache.current_user().face());

        let mut embed = CreateEmbed::new()
            .author(author)
            .description(&view.description)
            .color(view.color)
            .footer(footer)
            .timestamp(Timestamp::now());

        for field in &view.fields {
            embed = embed.field(&field.name, &field.value, field.inline);
        }
        if let Some(thumbnail) = &view.thumbnail {
            embed = embed.thumbnail(thumbnail);
        }
        if let Some(image) = &view.image {
            embed = embed.image(image);
        }

        embed
    }
}

fn build_rows(payload: &EmbedPayload) -> Vec<CreateActionRow> {
    payload.components
        .iter()
        .map(|row| CreateActionRow::Buttons(row.iter().map(build_button).collect()))
        .collect()
}

fn build_button(button: &Button) -> CreateButton {
    match button {
        Button::Action { action, emoji, label, style } => {
            let style = match style {
                ButtonStyle::Primary => SerenityButtonStyle::Primary,
                ButtonStyle::Secondary => SerenityButtonStyle::Secondary,
                ButtonStyle::Success => SerenityButtonStyle::Success,
                ButtonStyle::Danger => SerenityButtonStyle::Danger
            };

            let b = CreateButton::new(action.custom_id())
                .emoji(ReactionType::Unicode(emoji.to_string()))
                .style(style);

            match label {
                Some(label) => b.label(label),
                None => b
            }
        },
        Button::Link { label, url } => CreateButton::new_link(url).label(label)
    }
}

fn permissions(required: &[Capability]) -> Permissions {
    required.iter().fold(Permissions::empty(), |acc, c| {
        acc | match c {
            Capability::ManageChannels => Permissions::MANAGE_CHANNELS,
            Capability::SendMessages => Permissions::SEND_MESSAGES,
            Capability::EmbedLinks => Permissions::EMBED_LINKS
        }
    })
}

/// Permissions that are not cached count as missing.
fn granted(cached: Option<Permissions>, required: &[Capability]) -> bool {
    cached.is_some_and(|p| p.contains(permissions(required)))
}

/// Only an answer that the guild is gone counts as left. Any other failure
/// leaves the decision to the following steps.
fn still_joined(lookup: Result<(), PlatformError>) -> bool {
    match lookup {
        Ok(()) => true,
        Err(e) if e.disables_surface() => false,
        Err(e) => {
            warn!("Guild lookup failed, assuming it is still joined: {e}");
            true
        }
    }
}

fn convert(error: serenity::Error) -> PlatformError {
    match error {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => ErrorResponse {
            code: response.error.code as u32,
            message: response.error.message
        }.into(),
        other => PlatformError::Request(other.to_string())
    }
}

#[async_trait]
impl ChatPlatform for SerenityPlatform {
    async fn guild_available(&self, guild: GuildId) -> bool {
        if self.cache.guild(guild).is_some() {
            return true;
        }

        let lookup = self.http.get_guild(guild.into()).await.map(|_| ()).map_err(convert);
        still_joined(lookup)
    }

    async fn guilds(&self) -> Vec<GuildId> {
        self.cache.guilds().into_iter().map(Into::into).collect()
    }

    async fn fetch_channel(&self, channel: ChannelId) -> Result<ChannelInfo, PlatformError> {
        let fetched = self.http.get_channel(channel.into()).await.map_err(convert)?;
        let guild_channel = fetched.guild().ok_or(PlatformError::NotFound)?;

        Ok(ChannelInfo {
            id: channel,
            guild_id: Some(guild_channel.guild_id.into()),
            name: guild_channel.name,
            topic: guild_channel.topic.filter(|t| !t.is_empty())
        })
    }

    async fn message_exists(&self, channel: ChannelId, message: MessageId) -> Result<bool, PlatformError> {
        match self.http.get_message(channel.into(), message.into()).await.map_err(convert) {
            Ok(_) => Ok(true),
            Err(PlatformError::NotFound) => Ok(false),
            Err(e) => Err(e)
        }
    }

    async fn send_embed(&self, channel: ChannelId, payload: &EmbedPayload) -> Result<MessageId, PlatformError> {
        let builder = CreateMessage::new()
            .embed(self.build_embed(payload))
            .components(build_rows(payload));

        let sent = serenity::all::ChannelId::from(channel)
            .send_message(self.cache_http(), builder)
            .await
            .map_err(convert)?;

        Ok(sent.id.into())
    }

    async fn edit_embed(
        &self,
        channel: ChannelId,
        message: MessageId,
        payload: &EmbedPayload
    ) -> Result<(), PlatformError> {
        let builder = EditMessage::new()
            .embed(self.build_embed(payload))
            .components(build_rows(payload));

        serenity::all::ChannelId::from(channel)
            .edit_message(self.cache_http(), serenity::all::MessageId::from(message), builder)
            .await
            .map_err(convert)?;

        Ok(())
    }

    async fn set_presence(&self, presence: &PresenceView) -> Result<(), PlatformError> {
        let activity = match presence.kind {
            ActivityKind::Playing => ActivityData::playing(&presence.text),
            ActivityKind::Listening => ActivityData::listening(&presence.text),
            ActivityKind::Watching => ActivityData::watching(&presence.text)
        };

        let runners = self.shards.runners.lock().await;

        if runners.is_empty() {
            return Err(PlatformError::Unavailable);
        }

        for info in runners.values() {
            info.runner_tx.set_presence(Some(activity.clone()), OnlineStatus::Online);
        }

        Ok(())
    }

    async fn set_channel_name(&self, channel: ChannelId, name: &str) -> Result<(), PlatformError> {
        serenity::all::ChannelId::from(channel)
            .edit(self.cache_http(), EditChannel::new().name(name))
            .await
            .map_err(convert)?;

        Ok(())
    }

    async fn set_channel_topic(&self, channel: ChannelId, topic: Option<&str>) -> Result<(), PlatformError> {
        serenity::all::ChannelId::from(channel)
            .edit(self.cache_http(), EditChannel::new().topic(topic.unwrap_or_default()))
            .await
            .map_err(convert)?;

        Ok(())
    }

    async fn put_voice_status(&self, channel: ChannelId, status: Option<&str>) -> Result<(), PlatformError> {
        self.rest.put_voice_status(channel, status).await
    }

    async fn delete_voice_status(&self, channel: ChannelId) -> Result<(), PlatformError> {
        self.rest.delete_voice_status(channel).await
    }

    async fn has_permissions(&self, guild: GuildId, channel: ChannelId, required: &[Capability]) -> bool {
        let me = self.cache.current_user().id;
        let channel_id = serenity::all::ChannelId::from(channel);

        let cached = self.cache.guild(guild).and_then(|cached| {
            let target = cached.channels.get(&channel_id)?;
            let member = cached.members.get(&me)?;
            Some(cached.user_permissions_in(target, member))
        });

        if cached.is_none() {
            debug!("Permissions of {channel} in guild {guild} are not cached");
        }

        granted(cached, required)
    }

    async fn current_voice_channel(&self, guild: GuildId) -> Option<ChannelId> {
        let me = self.cache.current_user().id;

        self.cache.guild(guild)?
            .voice_states
            .get(&me)
            .and_then(|state| state.channel_id)
            .map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::view::ControlAction;

    #[test]
    fn capabilities_map_to_permission_bits() {
        let bits = permissions(&[Capability::SendMessages, Capability::EmbedLinks]);

        assert!(bits.contains(Permissions::SEND_MESSAGES | Permissions::EMBED_LINKS));
        assert!(!bits.contains(Permissions::MANAGE_CHANNELS));
    }

    #[test]
    fn uncached_permissions_count_as_missing() {
        assert!(!granted(None, &[Capability::ManageChannels]));
        assert!(granted(Some(Permissions::MANAGE_CHANNELS), &[Capability::ManageChannels]));
        assert!(!granted(Some(Permissions::SEND_MESSAGES), &[Capability::SendMessages, Capability::EmbedLinks]));
    }

    #[test]
    fn only_a_missing_guild_counts_as_left() {
        assert!(still_joined(Ok(())));
        assert!(!still_joined(Err(PlatformError::NotFound)));
        assert!(!still_joined(Err(PlatformError::MissingAccess)));
        assert!(still_joined(Err(PlatformError::Request("timeout".to_string()))));
    }

    #[test]
    fn idle_card_has_no_buttons() {
        let payload = crate::render::render_embed(None, &Config::default().branding);
        assert!(build_rows(&payload).is_empty());
    }

    #[test]
    fn action_buttons_carry_their_custom_id() {
        let button = Button::Action {
            action: ControlAction::Skip,
            emoji: "⏭️",
            label: None,
            style: ButtonStyle::Primary
        };

        let json = serde_json::to_string(&build_button(&button)).unwrap();
        assert!(json.contains("music_skip"));
    }
}
