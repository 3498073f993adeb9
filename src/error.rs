//! Error types for the console.

use thiserror::Error;

/// Console error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Credentials were rejected or the token is no longer valid.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The server answered 401. The session has already been cleared and the
    /// login page requested; there is no body for the caller.
    #[error("Session expired, redirecting to login")]
    SessionExpired,

    /// API returned a non-success response.
    #[error("{message}")]
    Request {
        /// HTTP status code.
        status: u16,
        /// Server-supplied `detail` or a generic message.
        message: String,
    },

    /// Transport failure (offline, refused, timed out).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Required input was missing before a request could be made.
    #[error("{0}")]
    Input(String),

    /// Camera unavailable or permission denied.
    #[error("Unable to access camera: {0}")]
    MediaAccess(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Client-local storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    /// Whether this error is the 401 outcome, which callers should not report.
    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// Whether the user can fix this and try again without reloading.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Request { .. } | Self::Network(_) | Self::Input(_) | Self::MediaAccess(_)
        )
    }

    pub(crate) fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }
}

/// Result type alias for console operations.
pub type Result<T> = std::result::Result<T, Error>;
