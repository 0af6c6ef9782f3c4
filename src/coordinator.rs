//! Turns playback lifecycle events into view updates.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::embed::{EmbedPublisher, ReconcileReport};
use crate::events::LifecycleEvent;
use crate::model::id::{ChannelId, GuildId};
use crate::model::player::SessionHandle;
use crate::model::snapshot::NowPlayingSnapshot;
use crate::platform::{AudioEngine, ChatPlatform, SurfaceStore};
use crate::presence::PresenceScheduler;
use crate::render::render_voice_display;
use crate::snapshot::SnapshotBuilder;
use crate::model::view::VoiceDisplay;
use crate::voice::VoiceDisplayWriter;

pub struct LifecycleCoordinator {
    pub(crate) snapshots: SnapshotBuilder,
    pub(crate) embeds: EmbedPublisher,
    pub(crate) presence: PresenceScheduler,
    pub(crate) voice: VoiceDisplayWriter,
    platform: Arc<dyn ChatPlatform>,
    engine: Arc<dyn AudioEngine>,
    store: Arc<dyn SurfaceStore>
}

impl LifecycleCoordinator {
    pub fn new(
        config: &Config,
        platform: Arc<dyn ChatPlatform>,
        engine: Arc<dyn AudioEngine>,
        store: Arc<dyn SurfaceStore>
    ) -> Self {
        Self {
            snapshots: SnapshotBuilder::new(Arc::clone(&engine), config.thumbnail_timeout),
            embeds: EmbedPublisher::new(
                Arc::clone(&platform),
                Arc::clone(&store),
                config.branding.clone(),
                config.reconcile_spacing
            ),
            presence: PresenceScheduler::new(Arc::clone(&platform), config.presence_refresh),
            voice: VoiceDisplayWriter::new(Arc::clone(&platform)),
            platform,
            engine,
            store
        }
    }

    pub async fn handle(&self, event: LifecycleEvent) {
        debug!("Handling {} event", event.name());

        match event {
            LifecycleEvent::TrackStart(session) => self.on_track_start(&session).await,
            LifecycleEvent::TrackEnd(session) => {
                debug!("Track ended in guild {}, waiting for the next one", session.guild_id);
            },
            LifecycleEvent::QueueEnd(session) => self.on_queue_end(&session).await,
            LifecycleEvent::PlayerCreate(session) => {
                info!("Player created in guild {}", session.guild_id);
            },
            LifecycleEvent::PlayerDisconnect(session) => self.on_disconnect(&session).await,
            LifecycleEvent::NodeError { node, error } => {
                error!("Audio node {node} errored: {error}");
            },
            LifecycleEvent::NodeDisconnect { node } => self.on_node_disconnect(&node).await
        }
    }

    async fn on_track_start(&self, session: &SessionHandle) {
        let snapshot = self.snapshots.from_session(session).await;

        if let Some(snapshot) = &snapshot {
            info!("Now playing {} in guild {}", snapshot.title, session.guild_id);
        }

        self.apply(session.guild_id, session.voice_channel_id, snapshot.as_ref()).await;
    }

    async fn on_queue_end(&self, session: &SessionHandle) {
        let guild = session.guild_id;
        info!("Queue ended in guild {guild}");

        if let Err(e) = self.embeds.update(guild, None).await {
            warn!("Failed to reset status message of guild {guild}: {e}");
        }

        let autoplay = match self.store.get(guild).await {
            Ok(record) => record.is_some_and(|r| r.autoplay),
            Err(e) => {
                warn!("Failed to read settings of guild {guild}: {e}");
                false
            }
        };

        if autoplay {
            self.engine.start_autoplay(guild).await;
            return;
        }

        tokio::join!(
            self.presence.set_idle(),
            self.clear_voice(guild, session.voice_channel_id)
        );

        self.engine.destroy(guild).await;
    }

    async fn on_disconnect(&self, session: &SessionHandle) {
        info!("Player of guild {} disconnected", session.guild_id);
        self.apply(session.guild_id, session.voice_channel_id, None).await;
    }

    /// The node took every player with it, so every guild is reset.
    async fn on_node_disconnect(&self, node: &str) {
        warn!("Audio node {node} disconnected, resetting views");

        self.presence.set_idle().await;

        let mut guilds = self.platform.guilds().await;
        guilds.extend(self.voice.touched_guilds());
        guilds.sort();
        guilds.dedup();

        for guild in guilds {
            let embed = async {
                if let Err(e) = self.embeds.update(guild, None).await {
                    warn!("Failed to reset status message of guild {guild}: {e}");
                }
            };

            tokio::join!(embed, self.clear_voice(guild, None));
        }
    }

    /// Pushes the snapshot to all three views at once. Every view handles its
    /// own failures.
    pub async fn apply(&self, guild: GuildId, voice_channel: Option<ChannelId>, snapshot: Option<&NowPlayingSnapshot>) {
        let embed = async {
            if let Err(e) = self.embeds.update(guild, snapshot).await {
                warn!("Failed to update status message of guild {guild}: {e}");
            }
        };

        let voice = async {
            match render_voice_display(snapshot) {
                VoiceDisplay::Set(text) => {
                    let Some(channel) = self.voice.resolve_channel(guild, voice_channel).await else {
                        debug!("No voice channel to advertise on in guild {guild}");
                        return;
                    };

                    if let Err(e) = self.voice.write(guild, channel, &text).await {
                        warn!("Failed to set voice display in guild {guild}: {e}");
                    }
                },
                VoiceDisplay::Clear => self.clear_voice(guild, voice_channel).await
            }
        };

        tokio::join!(embed, voice, self.presence.show(snapshot));
    }

    async fn clear_voice(&self, guild: GuildId, voice_channel: Option<ChannelId>) {
        let Some(channel) = self.voice.resolve_channel(guild, voice_channel).await else {
            return;
        };

        if let Err(e) = self.voice.clear(guild, channel).await {
            warn!("Failed to clear voice display in guild {guild}: {e}");
        }
    }

    /// Like [`apply`](Self::apply), targeting the voice channel of the guild's
    /// current session.
    pub async fn update_view(&self, guild: GuildId, snapshot: Option<&NowPlayingSnapshot>) {
        let voice_channel = self.engine.session(guild).await.and_then(|s| s.voice_channel_id);
        self.apply(guild, voice_channel, snapshot).await;
    }

    /// Re-derives every view of the guild from the engine's current state.
    pub async fn refresh(&self, guild: GuildId) {
        let session = self.engine.session(guild).await;
        let snapshot = match &session {
            Some(session) => self.snapshots.from_session(session).await,
            None => None
        };

        self.apply(guild, session.and_then(|s| s.voice_channel_id), snapshot.as_ref()).await;
    }

    pub async fn reconcile_on_startup(&self) -> ReconcileReport {
        self.embeds.reconcile_on_startup().await
    }
}
