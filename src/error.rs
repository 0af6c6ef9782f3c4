use thiserror::Error;

use crate::model::error::ErrorResponse;

/// Discord json error codes the core reacts to.
pub mod codes {
    pub const UNKNOWN_CHANNEL: u32 = 10003;
    pub const UNKNOWN_GUILD: u32 = 10004;
    pub const UNKNOWN_MESSAGE: u32 = 10008;
    pub const MISSING_ACCESS: u32 = 50001;
    pub const MISSING_PERMISSIONS: u32 = 50013;
}

/// How a failure should be treated by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The channel, message or guild no longer resolves.
    ResourceMissing,
    /// A capability check failed or the platform refused the call.
    PermissionDenied,
    /// Timeouts, rate limits and other request failures.
    Transient,
    /// Bad data handed over by a collaborator.
    MalformedInput
}

/// Failure reported by the chat platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Resource not found")]
    NotFound,
    #[error("Missing access")]
    MissingAccess,
    #[error("Missing permissions")]
    MissingPermissions,
    #[error("Api error {code}: {message}")]
    Api {
        code: u32,
        message: String
    },
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Endpoint unavailable")]
    Unavailable
}

impl PlatformError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::ResourceMissing,
            Self::MissingAccess | Self::MissingPermissions => ErrorKind::PermissionDenied,
            Self::Api { .. } | Self::Request(_) | Self::Unavailable => ErrorKind::Transient
        }
    }

    /// Whether the status surface of a guild can no longer be used at all.
    pub fn disables_surface(&self) -> bool {
        matches!(self, Self::NotFound | Self::MissingAccess | Self::MissingPermissions)
    }
}

impl From<ErrorResponse> for PlatformError {
    fn from(value: ErrorResponse) -> Self {
        match value.code {
            codes::UNKNOWN_CHANNEL | codes::UNKNOWN_GUILD | codes::UNKNOWN_MESSAGE => Self::NotFound,
            codes::MISSING_ACCESS => Self::MissingAccess,
            codes::MISSING_PERMISSIONS => Self::MissingPermissions,
            code => Self::Api {
                code,
                message: value.message
            }
        }
    }
}

impl From<reqwest::Error> for PlatformError {
    fn from(value: reqwest::Error) -> Self {
        Self::Request(value.to_string())
    }
}

/// Failure of the configuration storage.
#[derive(Debug, Error)]
#[error("Storage error: {0}")]
pub struct StoreError(pub String);

/// Error returned at every boundary of the core.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Malformed input: {0}")]
    Malformed(String)
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Platform(e) => e.kind(),
            Self::Store(_) => ErrorKind::Transient,
            Self::Malformed(_) => ErrorKind::MalformedInput
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_platform_codes() {
        let err = |code| PlatformError::from(ErrorResponse { code, message: String::new() });

        assert_eq!(err(codes::MISSING_ACCESS).kind(), ErrorKind::PermissionDenied);
        assert_eq!(err(codes::MISSING_PERMISSIONS).kind(), ErrorKind::PermissionDenied);
        assert_eq!(err(codes::UNKNOWN_CHANNEL).kind(), ErrorKind::ResourceMissing);
        assert_eq!(err(codes::UNKNOWN_MESSAGE).kind(), ErrorKind::ResourceMissing);
        assert!(err(codes::UNKNOWN_CHANNEL).disables_surface());
        assert!(!err(429).disables_surface());
        assert_eq!(err(429).kind(), ErrorKind::Transient);
    }
}
