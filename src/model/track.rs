use std::fmt;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Deserializer};

use crate::model::id::UserId;
use crate::source::TrackSource;

/// Artwork of a track as handed over by the audio engine.
#[derive(Clone, Default)]
pub enum Thumbnail {
    /// Already known url, not validated yet.
    Resolved(String),
    /// Artwork that is still being looked up by the engine.
    Pending(Shared<BoxFuture<'static, Option<String>>>),
    #[default]
    Absent
}

impl Thumbnail {
    pub fn pending<F>(fut: F) -> Self
    where
        F: std::future::Future<Output = Option<String>> + Send + 'static
    {
        Self::Pending(fut.boxed().shared())
    }
}

impl fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(url) => f.debug_tuple("Resolved").field(url).finish(),
            Self::Pending(_) => f.write_str("Pending"),
            Self::Absent => f.write_str("Absent")
        }
    }
}

/// Metadata of the track currently loaded in a player.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    #[serde(default, rename = "length", deserialize_with = "duration_from_millis")]
    pub duration: Option<Duration>,
    pub identifier: Option<String>,
    #[serde(default, rename = "sourceName")]
    pub source: TrackSource,
    #[serde(default, deserialize_with = "thumbnail_from_str")]
    pub thumbnail: Thumbnail,
    pub requester: Option<UserId>
}

fn duration_from_millis<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>
{
    Ok(<Option<u64> as Deserialize>::deserialize(deserializer)?
        .map(Duration::from_millis))
}

fn thumbnail_from_str<'de, D>(deserializer: D) -> Result<Thumbnail, D::Error>
where
    D: Deserializer<'de>
{
    Ok(<Option<String> as Deserialize>::deserialize(deserializer)?
        .map(Thumbnail::Resolved)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_engine_payload() {
        let info: TrackInfo = serde_json::from_value(serde_json::json!({
            "title": "Believer",
            "author": "Imagine Dragons",
            "length": 204000,
            "identifier": "7wtfhZwyrcc",
            "sourceName": "youtube",
            "thumbnail": null,
            "requester": "1234"
        })).unwrap();

        assert_eq!(info.duration, Some(Duration::from_millis(204000)));
        assert_eq!(info.source, TrackSource::Youtube);
        assert!(matches!(info.thumbnail, Thumbnail::Absent));
        assert_eq!(info.requester, UserId::new(1234));
    }
}
