//! Error types for the qBittorrent Web API client.

use thiserror::Error;

/// Errors that can occur while talking to the qBittorrent Web API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured host is not a usable base URL.
    #[error("invalid API host: {host}")]
    InvalidHost {
        /// The host string as configured.
        host: String,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Build {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The login call was rejected. Never retried.
    #[error("failed to log in to qBittorrent: {message}")]
    Auth {
        /// Response body or status that explains the rejection.
        message: String,
    },

    /// Network-level failure (DNS, connection refused, timeout) after all attempts.
    #[error("API request to {path} failed after {attempts} attempt(s): {source}")]
    Transport {
        /// API path that failed.
        path: String,
        /// Number of attempts made.
        attempts: u32,
        /// The last underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success HTTP status.
    #[error("HTTP {status} from {path}")]
    HttpStatus {
        /// API path that returned the status.
        path: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The API answered with a body that could not be parsed.
    #[error("unexpected response from {path}: {source}")]
    InvalidResponse {
        /// API path whose response was malformed.
        path: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// Creates an invalid host error.
    pub fn invalid_host(host: impl Into<String>) -> Self {
        Self::InvalidHost { host: host.into() }
    }

    /// Creates an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Creates a transport error from the last failed attempt.
    pub fn transport(path: impl Into<String>, attempts: u32, source: reqwest::Error) -> Self {
        Self::Transport {
            path: path.into(),
            attempts,
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(path: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            path: path.into(),
            status,
        }
    }

    /// Creates an invalid response error.
    pub fn invalid_response(path: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidResponse {
            path: path.into(),
            source,
        }
    }

    /// Returns true for login rejections.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Returns true for exhausted network-level failures.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns true for application-level failures: bad status or malformed body.
    #[must_use]
    pub fn is_api(&self) -> bool {
        matches!(self, Self::HttpStatus { .. } | Self::InvalidResponse { .. })
    }
}
