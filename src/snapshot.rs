use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::model::id::GuildId;
use crate::model::player::SessionHandle;
use crate::model::snapshot::{NowPlayingSnapshot, ThumbnailUrl};
use crate::model::track::{Thumbnail, TrackInfo};
use crate::platform::AudioEngine;

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_AUTHOR: &str = "Unknown Artist";

/// Builds [`NowPlayingSnapshot`]s from the engine's players.
pub struct SnapshotBuilder {
    engine: Arc<dyn AudioEngine>,
    thumbnail_timeout: Duration
}

impl SnapshotBuilder {
    pub fn new(engine: Arc<dyn AudioEngine>, thumbnail_timeout: Duration) -> Self {
        Self {
            engine,
            thumbnail_timeout
        }
    }

    /// Snapshot of the session's current state, `None` if nothing is loaded.
    pub async fn build(&self, guild: GuildId) -> Option<NowPlayingSnapshot> {
        let session = self.engine.session(guild).await?;
        self.from_session(&session).await
    }

    pub async fn from_session(&self, session: &SessionHandle) -> Option<NowPlayingSnapshot> {
        let track = session.current.as_ref()?;

        Some(NowPlayingSnapshot {
            title: non_blank(track.title.as_deref()).unwrap_or(UNKNOWN_TITLE).to_string(),
            author: non_blank(track.author.as_deref()).unwrap_or(UNKNOWN_AUTHOR).to_string(),
            duration: track.duration.unwrap_or_default(),
            requester: track.requester,
            paused: session.paused,
            volume: session.volume,
            loop_mode: session.loop_mode,
            queue_len: session.queue_len,
            thumbnail: resolve_thumbnail(track, self.thumbnail_timeout).await
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Resolves the artwork of a track, in order: a known url, a pending lookup
/// finishing within `timeout`, the source's template url. Anything invalid
/// falls through to the next step.
pub async fn resolve_thumbnail(track: &TrackInfo, timeout: Duration) -> Option<ThumbnailUrl> {
    let candidate = match &track.thumbnail {
        Thumbnail::Resolved(url) => Some(url.clone()),
        Thumbnail::Pending(pending) => match tokio::time::timeout(timeout, pending.clone()).await {
            Ok(url) => url,
            Err(_) => {
                debug!("Thumbnail lookup timed out after {timeout:?}");
                None
            }
        },
        Thumbnail::Absent => None
    };

    ThumbnailUrl::parse(candidate.as_deref())
        .or_else(|| {
            let fallback = track.identifier.as_deref()
                .and_then(|id| track.source.thumbnail_for(id));

            ThumbnailUrl::parse(fallback.as_deref())
        })
}
