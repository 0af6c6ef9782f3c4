use std::time::Duration;

use serde::de::Error;
use serde::{Deserialize, Deserializer};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bot token, used for the voice status endpoint.
    pub token: String,
    /// Base url of the platform's REST api.
    pub api_base: String,
    /// How often an active presence is re-applied, must not be zero.
    #[serde(deserialize_with = "nonzero_duration_from_millis")]
    pub presence_refresh: Duration,
    /// Upper bound on waiting for a pending thumbnail.
    #[serde(deserialize_with = "duration_from_millis")]
    pub thumbnail_timeout: Duration,
    /// Pause between guilds during startup reconciliation.
    #[serde(deserialize_with = "duration_from_millis")]
    pub reconcile_spacing: Duration,
    pub branding: Branding
}

/// Static content of the status embed.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Branding {
    pub title: String,
    pub icon_url: String,
    pub invite_url: String,
    pub footer: String,
    pub idle_image: String,
    pub playing_image: String,
    pub support_url: String
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: "https://discord.com/api/v10".to_string(),
            presence_refresh: Duration::from_secs(30),
            thumbnail_timeout: Duration::from_millis(2000),
            reconcile_spacing: Duration::from_millis(100),
            branding: Branding::default()
        }
    }
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            title: "Ultimate Music Control Center".to_string(),
            icon_url: "https://cdn.discordapp.com/emojis/896724352949706762.gif".to_string(),
            invite_url: "https://discord.gg/xQF9f9yUEM".to_string(),
            footer: "N.J. | FáZoltán Music Bot • Developed By BABLO".to_string(),
            idle_image: "https://i.ibb.co/DDSdKy31/ezgif-8aec7517f2146d.gif".to_string(),
            playing_image: "https://i.ibb.co/KzbPV8jd/aaa.gif".to_string(),
            support_url: "https://discord.gg/xQF9f9yUEM".to_string()
        }
    }
}

fn duration_from_millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

fn nonzero_duration_from_millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>
{
    match u64::deserialize(deserializer)? {
        0 => Err(D::Error::custom("duration must be greater than zero")),
        millis => Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: Config = serde_json::from_value(serde_json::json!({
            "token": "abc",
            "presence_refresh": 5000
        })).unwrap();

        assert_eq!(config.token, "abc");
        assert_eq!(config.presence_refresh, Duration::from_secs(5));
        assert_eq!(config.thumbnail_timeout, Duration::from_millis(2000));
        assert_eq!(config.reconcile_spacing, Duration::from_millis(100));
        assert_eq!(config.branding.title, "Ultimate Music Control Center");
    }

    #[test]
    fn zero_refresh_interval_is_rejected() {
        let parsed = serde_json::from_value::<Config>(serde_json::json!({ "presence_refresh": 0 }));
        assert!(parsed.is_err());

        let parsed = serde_json::from_value::<Config>(serde_json::json!({ "reconcile_spacing": 0 }));
        assert_eq!(parsed.unwrap().reconcile_spacing, Duration::ZERO);
    }
}
