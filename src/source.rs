use serde::{Deserialize, Deserializer};

/// The origin a track was resolved from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TrackSource {
    Youtube,
    Other(String),
    #[default]
    Unknown
}

impl TrackSource {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "youtube" | "ytsearch" | "youtube_music" | "ytmsearch" => Self::Youtube,
            "" => Self::Unknown,
            _ => Self::Other(name.to_string())
        }
    }

    /// Deterministic artwork url for sources that expose one by identifier.
    pub fn thumbnail_for(&self, identifier: &str) -> Option<String> {
        let identifier = identifier.trim();

        if identifier.is_empty() {
            return None;
        }

        match self {
            Self::Youtube => Some(format!("https://img.youtube.com/vi/{identifier}/maxresdefault.jpg")),
            _ => None
        }
    }
}

impl<'de> Deserialize<'de> for TrackSource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>
    {
        Ok(<Option<String> as Deserialize>::deserialize(deserializer)?
            .map(|name| Self::from_name(&name))
            .unwrap_or_default())
    }
}
