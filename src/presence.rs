use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::model::snapshot::NowPlayingSnapshot;
use crate::model::view::PresenceView;
use crate::platform::ChatPlatform;
use crate::render::{render_presence, render_server_count};

/// The presence currently shown by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedPresence {
    pub text: String,
    pub playing: bool
}

#[derive(Default)]
struct State {
    displayed: Option<DisplayedPresence>,
    refresh: Option<JoinHandle<()>>
}

impl State {
    fn cancel_refresh(&mut self) {
        if let Some(handle) = self.refresh.take() {
            handle.abort();
        }
    }
}

/// Owns the bot's presence. While a track plays the presence is re-applied
/// periodically, since the platform may silently reset it.
pub struct PresenceScheduler {
    platform: Arc<dyn ChatPlatform>,
    refresh_every: Option<Duration>,
    state: Mutex<State>,
    /// Held from the state change until the platform call returns, so writes
    /// reach the platform in transition order.
    applying: AsyncMutex<()>
}

impl PresenceScheduler {
    /// A zero `refresh_every` disables the periodic refresh.
    pub fn new(platform: Arc<dyn ChatPlatform>, refresh_every: Duration) -> Self {
        if refresh_every.is_zero() {
            warn!("Presence refresh interval is zero, refreshing is disabled");
        }

        Self {
            platform,
            refresh_every: Some(refresh_every).filter(|d| !d.is_zero()),
            state: Mutex::new(State::default()),
            applying: AsyncMutex::new(())
        }
    }

    pub fn displayed(&self) -> Option<DisplayedPresence> {
        self.state.lock().displayed.clone()
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.lock()
            .refresh
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Switches to the presence matching the snapshot.
    pub async fn show(&self, snapshot: Option<&NowPlayingSnapshot>) {
        match snapshot {
            Some(_) => self.set_active(render_presence(snapshot)).await,
            None => self.set_idle().await
        }
    }

    pub async fn set_active(&self, view: PresenceView) {
        let _applying = self.applying.lock().await;

        {
            let mut state = self.state.lock();

            state.cancel_refresh();
            state.displayed = Some(DisplayedPresence {
                text: view.text.clone(),
                playing: true
            });
            state.refresh = self.spawn_refresh(view.clone());
        }

        self.apply(&view).await;
        info!("Presence locked to {}", view.text);
    }

    pub async fn set_idle(&self) {
        let view = render_presence(None);
        let _applying = self.applying.lock().await;

        {
            let mut state = self.state.lock();

            state.cancel_refresh();
            state.displayed = Some(DisplayedPresence {
                text: view.text.clone(),
                playing: false
            });
        }

        self.apply(&view).await;
        info!("Presence reset to {}", view.text);
    }

    /// Shows the server count, unless a track is being advertised.
    pub async fn set_server_count(&self, servers: usize) {
        let view = render_server_count(servers);
        let _applying = self.applying.lock().await;

        {
            let mut state = self.state.lock();

            if state.displayed.as_ref().is_some_and(|d| d.playing) {
                return;
            }

            state.displayed = Some(DisplayedPresence {
                text: view.text.clone(),
                playing: false
            });
        }

        self.apply(&view).await;
    }

    fn spawn_refresh(&self, view: PresenceView) -> Option<JoinHandle<()>> {
        let period = self.refresh_every?;
        let platform = Arc::clone(&self.platform);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let handle = tokio::spawn(async move {
            loop {
                ticker.tick().await;

                match platform.set_presence(&view).await {
                    Ok(()) => debug!("Presence refreshed: {}", view.text),
                    Err(e) => warn!("Failed to refresh presence: {e}")
                }
            }
        });

        Some(handle)
    }

    async fn apply(&self, view: &PresenceView) {
        if let Err(e) = self.platform.set_presence(view).await {
            warn!("Failed to set presence: {e}");
        }
    }
}

impl Drop for PresenceScheduler {
    fn drop(&mut self) {
        self.state.get_mut().cancel_refresh();
    }
}
