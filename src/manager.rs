use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, warn};

use crate::coordinator::LifecycleCoordinator;
use crate::events::LifecycleEvent;
use crate::model::id::GuildId;

struct Worker {
    id: u64,
    sender: UnboundedSender<LifecycleEvent>
}

/// Routes lifecycle events to one worker per guild, so a guild's events are
/// handled in delivery order while guilds don't wait on each other.
///
/// A worker retires once its guild's session ended and nothing else is
/// queued; the next event of the guild starts a fresh one.
pub(crate) struct GuildQueues {
    coordinator: Arc<LifecycleCoordinator>,
    workers: Arc<DashMap<GuildId, Worker>>,
    next_id: AtomicU64
}

impl GuildQueues {
    pub fn new(coordinator: Arc<LifecycleCoordinator>) -> Self {
        Self {
            coordinator,
            workers: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(0)
        }
    }

    pub fn route(&self, event: LifecycleEvent) {
        let Some(guild) = event.guild() else {
            let coordinator = Arc::clone(&self.coordinator);
            tokio::spawn(async move { coordinator.handle(event).await });
            return;
        };

        // Sending under the entry lock keeps a retiring worker from missing
        // the event.
        let mut worker = self.workers
            .entry(guild)
            .or_insert_with(|| self.spawn_worker(guild));

        if let Err(e) = worker.sender.send(event) {
            warn!("Worker of guild {guild} is gone, restarting it");
            *worker = self.spawn_worker(guild);

            if let Err(e) = worker.sender.send(e.0) {
                error!("Dropped {} event of guild {guild}", e.0.name());
            }
        }
    }

    #[cfg(test)]
    fn active_workers(&self) -> usize {
        self.workers.len()
    }

    fn spawn_worker(&self, guild: GuildId) -> Worker {
        let (sender, rx) = unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        tokio::spawn(run_worker(
            guild,
            id,
            rx,
            Arc::clone(&self.coordinator),
            Arc::clone(&self.workers)
        ));

        Worker {
            id,
            sender
        }
    }
}

async fn run_worker(
    guild: GuildId,
    id: u64,
    mut rx: UnboundedReceiver<LifecycleEvent>,
    coordinator: Arc<LifecycleCoordinator>,
    workers: Arc<DashMap<GuildId, Worker>>
) {
    debug!("Event worker of guild {guild} started");

    while let Some(event) = rx.recv().await {
        let ends_session = matches!(
            event,
            LifecycleEvent::QueueEnd(_) | LifecycleEvent::PlayerDisconnect(_)
        );

        coordinator.handle(event).await;

        if ends_session && workers.remove_if(&guild, |_, w| w.id == id && rx.is_empty()).is_some() {
            debug!("Event worker of guild {guild} retired");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::Config;
    use crate::store::MemoryStore;
    use crate::testing::{believer, channel, guild, FakeEngine, FakePlatform};

    fn queues() -> (Arc<FakePlatform>, GuildQueues) {
        let platform = Arc::new(FakePlatform::new());
        platform.add_channel(guild(1), channel(10), "Lounge", None);

        let coordinator = LifecycleCoordinator::new(
            &Config::default(),
            platform.clone(),
            Arc::new(FakeEngine::default()),
            Arc::new(MemoryStore::new())
        );

        (platform, GuildQueues::new(Arc::new(coordinator)))
    }

    #[tokio::test(start_paused = true)]
    async fn worker_retires_after_the_session_ends() {
        let (platform, queues) = queues();

        queues.route(LifecycleEvent::TrackStart(believer(guild(1), channel(10))));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(queues.active_workers(), 1);

        queues.route(LifecycleEvent::PlayerDisconnect(believer(guild(1), channel(10))));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(queues.active_workers(), 0);

        queues.route(LifecycleEvent::TrackStart(believer(guild(1), channel(10))));
        tokio::time::sleep(Duration::from_millis(10)).await;

        let presences = platform.presences();
        assert_eq!(presences.len(), 3);
        assert_eq!(presences[2].text, "🎵 Believer");
    }

    #[tokio::test(start_paused = true)]
    async fn queued_events_keep_a_worker_alive() {
        let (platform, queues) = queues();

        queues.route(LifecycleEvent::PlayerDisconnect(believer(guild(1), channel(10))));
        queues.route(LifecycleEvent::TrackStart(believer(guild(1), channel(10))));
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(queues.active_workers(), 1);
        assert_eq!(platform.presences().last().unwrap().text, "🎵 Believer");
    }
}
