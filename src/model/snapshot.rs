use std::time::Duration;

use reqwest::Url;

use crate::model::id::UserId;
use crate::model::player::LoopMode;

/// Immutable summary of what a session is playing right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlayingSnapshot {
    pub title: String,
    pub author: String,
    pub duration: Duration,
    pub requester: Option<UserId>,
    pub paused: bool,
    pub volume: u16,
    pub loop_mode: LoopMode,
    pub queue_len: usize,
    pub thumbnail: Option<ThumbnailUrl>
}

/// An absolute url that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailUrl(String);

impl ThumbnailUrl {
    /// Validates a candidate thumbnail. Blank strings and anything that does not
    /// parse as an absolute url yield `None`.
    pub fn parse(candidate: Option<&str>) -> Option<Self> {
        let candidate = candidate?;

        if candidate.trim().is_empty() {
            return None;
        }

        Url::parse(candidate).ok().map(|_| Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
