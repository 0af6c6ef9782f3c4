use serde::Deserialize;
use thiserror::Error;

/// Error body returned by the platform's REST api.
#[derive(Deserialize, Debug, Error)]
#[error("Platform responded with error {code}: {message}")]
pub struct ErrorResponse {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub message: String
}
