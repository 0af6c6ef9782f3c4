pub mod model;
pub mod config;
pub mod error;
pub mod events;
pub mod platform;
pub mod source;
pub mod store;
pub mod snapshot;
pub mod render;
pub mod voice;
pub mod embed;
pub mod presence;
pub mod coordinator;
pub mod rest;
pub mod stream;
mod manager;
#[cfg(feature = "serenity")]
pub mod serenity_ext;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::{info, warn};

use crate::config::Config;
use crate::coordinator::LifecycleCoordinator;
use crate::embed::ReconcileReport;
use crate::events::LifecycleEvent;
use crate::manager::GuildQueues;
use crate::model::id::{ChannelId, GuildId, MessageId};
use crate::model::snapshot::NowPlayingSnapshot;
use crate::platform::{AudioEngine, ChatPlatform, SurfaceStore};
use crate::stream::{EventSender, EventStream};

/// Keeps the status message, the bot presence and the voice channel display
/// in sync with playback.
pub struct StatusSync {
    coordinator: Arc<LifecycleCoordinator>,
    queues: GuildQueues,
    sender: EventSender,
    receiver: Mutex<Option<UnboundedReceiver<LifecycleEvent>>>
}

impl StatusSync {
    pub fn new(
        config: Config,
        platform: Arc<dyn ChatPlatform>,
        engine: Arc<dyn AudioEngine>,
        store: Arc<dyn SurfaceStore>
    ) -> Self {
        let coordinator = Arc::new(LifecycleCoordinator::new(&config, platform, engine, store));
        let (tx, rx) = unbounded_channel();

        Self {
            queues: GuildQueues::new(Arc::clone(&coordinator)),
            coordinator,
            sender: EventSender(tx),
            receiver: Mutex::new(Some(rx))
        }
    }

    /// Handles a lifecycle event right away.
    pub async fn on_lifecycle_event(&self, event: LifecycleEvent) {
        self.coordinator.handle(event).await;
    }

    /// Pushes the given state, or the idle state, to every view of the guild.
    pub async fn update_view(&self, guild: GuildId, snapshot: Option<&NowPlayingSnapshot>) {
        self.coordinator.update_view(guild, snapshot).await;
    }

    /// Re-derives every view of the guild from the engine.
    pub async fn refresh(&self, guild: GuildId) {
        self.coordinator.refresh(guild).await;
    }

    /// Validates every recorded status message. Run it once the platform's
    /// cache is ready, otherwise guilds and permissions look missing and
    /// surfaces get skipped or disabled.
    pub async fn reconcile_on_startup(&self) -> ReconcileReport {
        self.coordinator.reconcile_on_startup().await
    }

    /// Sends a new idle status message to the channel and records it.
    pub async fn publish(&self, channel: ChannelId, guild: GuildId) -> Option<MessageId> {
        self.coordinator.embeds.publish(channel, guild).await
    }

    pub async fn set_server_count(&self, servers: usize) {
        self.coordinator.presence.set_server_count(servers).await;
    }

    /// Sender for queued events, processed by [`StatusSync::run`].
    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// Starts [`StatusSync::run`] in the background and returns a sender
    /// feeding it.
    pub fn spawn_event_loop(self: &Arc<Self>) -> EventSender {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run().await });

        self.sender()
    }

    /// Processes queued events until every sender is gone. Only one loop can
    /// run at a time.
    pub async fn run(&self) {
        let Some(mut stream) = EventStream::new(&self.receiver) else {
            warn!("Event loop is already running");
            return;
        };

        info!("Status event loop started");

        while let Some(event) = stream.next().await {
            self.queues.route(event);
        }
    }
}
