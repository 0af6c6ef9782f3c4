use reqwest::{Client, Response, StatusCode};
use serde_json::json;

use crate::config::Config;
use crate::error::PlatformError;
use crate::model::error::ErrorResponse;
use crate::model::id::ChannelId;

/// Minimal REST client for the voice channel status endpoint, which the chat
/// libraries don't cover.
#[derive(Clone)]
pub struct RestClient {
    http: Client,
    base: String,
    authorization: String
}

impl RestClient {
    pub fn new(config: &Config) -> Self {
        let token = config.token.trim();
        let authorization = if token.starts_with("Bot ") {
            token.to_string()
        } else {
            format!("Bot {token}")
        };

        Self {
            http: Client::new(),
            base: config.api_base.trim_end_matches('/').to_string(),
            authorization
        }
    }

    fn route(&self, channel: ChannelId) -> String {
        format!("{}/channels/{channel}/voice-status", self.base)
    }

    pub async fn put_voice_status(&self, channel: ChannelId, status: Option<&str>) -> Result<(), PlatformError> {
        let response = self.http.put(self.route(channel))
            .header("Authorization", &self.authorization)
            .json(&json!({ "status": status }))
            .send()
            .await?;

        check(response).await
    }

    pub async fn delete_voice_status(&self, channel: ChannelId) -> Result<(), PlatformError> {
        let response = self.http.delete(self.route(channel))
            .header("Authorization", &self.authorization)
            .send()
            .await?;

        check(response).await
    }
}

async fn check(response: Response) -> Result<(), PlatformError> {
    let status = response.status();

    if status.is_success() {
        return Ok(());
    }

    match response.json::<ErrorResponse>().await {
        Ok(body) if body.code != 0 => Err(body.into()),
        _ if status == StatusCode::NOT_FOUND || status == StatusCode::METHOD_NOT_ALLOWED => Err(PlatformError::Unavailable),
        _ => Err(PlatformError::Request(format!("voice status endpoint answered {status}")))
    }
}
