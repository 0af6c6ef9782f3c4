//! Recording fakes of the collaborators, shared by the unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::PlatformError;
use crate::model::id::{ChannelId, GuildId, MessageId, UserId};
use crate::model::player::{LoopMode, SessionHandle};
use crate::model::track::{Thumbnail, TrackInfo};
use crate::model::view::{EmbedPayload, PresenceView};
use crate::platform::{AudioEngine, Capability, ChannelInfo, ChatPlatform};
use crate::source::TrackSource;

pub fn guild(id: u64) -> GuildId {
    GuildId::new(id).unwrap()
}

pub fn channel(id: u64) -> ChannelId {
    ChannelId::new(id).unwrap()
}

pub fn message(id: u64) -> MessageId {
    MessageId::new(id).unwrap()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GuildAvailable(GuildId),
    FetchChannel(ChannelId),
    MessageExists(ChannelId, MessageId),
    SendEmbed(ChannelId, EmbedPayload),
    EditEmbed(ChannelId, MessageId, EmbedPayload),
    SetPresence(PresenceView),
    SetName(ChannelId, String),
    SetTopic(ChannelId, Option<String>),
    PutVoiceStatus(ChannelId, Option<String>),
    DeleteVoiceStatus(ChannelId),
    HasPermissions(GuildId, ChannelId)
}

impl Call {
    /// Whether the call was made against the given guild or one of its channels.
    pub fn touches(&self, guild: GuildId, channels: &[ChannelId]) -> bool {
        match self {
            Self::GuildAvailable(g) | Self::HasPermissions(g, _) if *g == guild => true,
            Self::FetchChannel(c)
            | Self::MessageExists(c, _)
            | Self::SendEmbed(c, _)
            | Self::EditEmbed(c, _, _)
            | Self::SetName(c, _)
            | Self::SetTopic(c, _)
            | Self::PutVoiceStatus(c, _)
            | Self::DeleteVoiceStatus(c)
            | Self::HasPermissions(_, c) => channels.contains(c),
            _ => false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    FetchChannel,
    MessageExists,
    Send,
    Edit,
    Presence,
    Name,
    Topic,
    PutVoiceStatus,
    DeleteVoiceStatus
}

#[derive(Debug, Clone, Copy)]
pub enum Fail {
    NotFound,
    MissingAccess,
    Request
}

impl Fail {
    fn error(self) -> PlatformError {
        match self {
            Self::NotFound => PlatformError::NotFound,
            Self::MissingAccess => PlatformError::MissingAccess,
            Self::Request => PlatformError::Request("boom".to_string())
        }
    }
}

#[derive(Default)]
pub struct FakePlatform {
    calls: Mutex<Vec<Call>>,
    guilds: Mutex<HashSet<GuildId>>,
    channels: Mutex<HashMap<ChannelId, ChannelInfo>>,
    messages: Mutex<HashSet<(ChannelId, MessageId)>>,
    denied: Mutex<HashSet<ChannelId>>,
    failures: Mutex<HashMap<Op, Fail>>,
    voice: Mutex<HashMap<GuildId, ChannelId>>,
    presence_delays: Mutex<VecDeque<Duration>>,
    next_message: AtomicU64
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            next_message: AtomicU64::new(1000),
            ..Default::default()
        }
    }

    pub fn add_guild(&self, guild: GuildId) {
        self.guilds.lock().insert(guild);
    }

    pub fn add_channel(&self, guild: GuildId, channel: ChannelId, name: &str, topic: Option<&str>) {
        self.add_guild(guild);
        self.channels.lock().insert(channel, ChannelInfo {
            id: channel,
            guild_id: Some(guild),
            name: name.to_string(),
            topic: topic.map(ToString::to_string)
        });
    }

    pub fn remove_channel(&self, channel: ChannelId) {
        self.channels.lock().remove(&channel);
    }

    pub fn add_message(&self, channel: ChannelId, message: MessageId) {
        self.messages.lock().insert((channel, message));
    }

    pub fn deny(&self, channel: ChannelId) {
        self.denied.lock().insert(channel);
    }

    pub fn fail(&self, op: Op, fail: Fail) {
        self.failures.lock().insert(op, fail);
    }

    pub fn heal(&self, op: Op) {
        self.failures.lock().remove(&op);
    }

    /// Makes the next presence call take `delay` before it lands.
    pub fn delay_presence(&self, delay: Duration) {
        self.presence_delays.lock().push_back(delay);
    }

    pub fn connect_voice(&self, guild: GuildId, channel: ChannelId) {
        self.voice.lock().insert(guild, channel);
    }

    pub fn channel(&self, channel: ChannelId) -> Option<ChannelInfo> {
        self.channels.lock().get(&channel).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock())
    }

    pub fn presences(&self) -> Vec<PresenceView> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SetPresence(p) => Some(p),
                _ => None
            })
            .collect()
    }

    fn record(&self, call: Call, op: Option<Op>) -> Result<(), PlatformError> {
        self.calls.lock().push(call);

        match op.and_then(|op| self.failures.lock().get(&op).copied()) {
            Some(fail) => Err(fail.error()),
            None => Ok(())
        }
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    async fn guild_available(&self, guild: GuildId) -> bool {
        let _ = self.record(Call::GuildAvailable(guild), None);
        self.guilds.lock().contains(&guild)
    }

    async fn guilds(&self) -> Vec<GuildId> {
        let mut guilds = self.guilds.lock().iter().copied().collect::<Vec<_>>();
        guilds.sort();
        guilds
    }

    async fn fetch_channel(&self, channel: ChannelId) -> Result<ChannelInfo, PlatformError> {
        self.record(Call::FetchChannel(channel), Some(Op::FetchChannel))?;
        self.channel(channel).ok_or(PlatformError::NotFound)
    }

    async fn message_exists(&self, channel: ChannelId, message: MessageId) -> Result<bool, PlatformError> {
        self.record(Call::MessageExists(channel, message), Some(Op::MessageExists))?;
        Ok(self.messages.lock().contains(&(channel, message)))
    }

    async fn send_embed(&self, channel: ChannelId, payload: &EmbedPayload) -> Result<MessageId, PlatformError> {
        self.record(Call::SendEmbed(channel, payload.clone()), Some(Op::Send))?;

        if self.channel(channel).is_none() {
            return Err(PlatformError::NotFound);
        }

        let id = message(self.next_message.fetch_add(1, Ordering::SeqCst));
        self.add_message(channel, id);

        Ok(id)
    }

    async fn edit_embed(
        &self,
        channel: ChannelId,
        message: MessageId,
        payload: &EmbedPayload
    ) -> Result<(), PlatformError> {
        self.record(Call::EditEmbed(channel, message, payload.clone()), Some(Op::Edit))?;

        if self.channel(channel).is_none() || !self.messages.lock().contains(&(channel, message)) {
            return Err(PlatformError::NotFound);
        }

        Ok(())
    }

    async fn set_presence(&self, presence: &PresenceView) -> Result<(), PlatformError> {
        let delay = self.presence_delays.lock().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.record(Call::SetPresence(presence.clone()), Some(Op::Presence))
    }

    async fn set_channel_name(&self, channel: ChannelId, name: &str) -> Result<(), PlatformError> {
        self.record(Call::SetName(channel, name.to_string()), Some(Op::Name))?;

        match self.channels.lock().get_mut(&channel) {
            Some(info) => {
                info.name = name.to_string();
                Ok(())
            },
            None => Err(PlatformError::NotFound)
        }
    }

    async fn set_channel_topic(&self, channel: ChannelId, topic: Option<&str>) -> Result<(), PlatformError> {
        self.record(Call::SetTopic(channel, topic.map(ToString::to_string)), Some(Op::Topic))?;

        match self.channels.lock().get_mut(&channel) {
            Some(info) => {
                info.topic = topic.map(ToString::to_string);
                Ok(())
            },
            None => Err(PlatformError::NotFound)
        }
    }

    async fn put_voice_status(&self, channel: ChannelId, status: Option<&str>) -> Result<(), PlatformError> {
        self.record(Call::PutVoiceStatus(channel, status.map(ToString::to_string)), Some(Op::PutVoiceStatus))
    }

    async fn delete_voice_status(&self, channel: ChannelId) -> Result<(), PlatformError> {
        self.record(Call::DeleteVoiceStatus(channel), Some(Op::DeleteVoiceStatus))
    }

    async fn has_permissions(&self, guild: GuildId, channel: ChannelId, _required: &[Capability]) -> bool {
        let _ = self.record(Call::HasPermissions(guild, channel), None);
        !self.denied.lock().contains(&channel)
    }

    async fn current_voice_channel(&self, guild: GuildId) -> Option<ChannelId> {
        self.voice.lock().get(&guild).copied()
    }
}

#[derive(Default)]
pub struct FakeEngine {
    sessions: Mutex<HashMap<GuildId, SessionHandle>>,
    pub autoplayed: Mutex<Vec<GuildId>>,
    pub destroyed: Mutex<Vec<GuildId>>
}

impl FakeEngine {
    pub fn insert(&self, session: SessionHandle) {
        self.sessions.lock().insert(session.guild_id, session);
    }
}

#[async_trait]
impl AudioEngine for FakeEngine {
    async fn session(&self, guild: GuildId) -> Option<SessionHandle> {
        self.sessions.lock().get(&guild).cloned()
    }

    async fn start_autoplay(&self, guild: GuildId) {
        self.autoplayed.lock().push(guild);
    }

    async fn destroy(&self, guild: GuildId) {
        self.sessions.lock().remove(&guild);
        self.destroyed.lock().push(guild);
    }
}

/// "Believer" by Imagine Dragons, playing unpaused at volume 50.
pub fn believer(guild: GuildId, voice: ChannelId) -> SessionHandle {
    SessionHandle {
        guild_id: guild,
        voice_channel_id: Some(voice),
        playing: true,
        paused: false,
        volume: 50,
        loop_mode: LoopMode::Off,
        queue_len: 2,
        current: Some(TrackInfo {
            title: Some("Believer".to_string()),
            author: Some("Imagine Dragons".to_string()),
            duration: Some(std::time::Duration::from_millis(204000)),
            identifier: Some("7wtfhZwyrcc".to_string()),
            source: TrackSource::Youtube,
            thumbnail: Thumbnail::Resolved("https://example.com/a.jpg".to_string()),
            requester: UserId::new(77)
        })
    }
}
