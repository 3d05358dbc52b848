//! qBittorrent Web API client with session handling and retry.
//!
//! # Example
//!
//! ```no_run
//! use auto_tagger_core::client::{SessionClient, SessionConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SessionConfig::new("http://localhost:8080", "admin", "adminadmin");
//! let session = SessionClient::connect(&config).await?;
//! let body = session
//!     .get("/api/v2/torrents/info", &[("hashes", "abc123")])
//!     .await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

mod error;
mod retry;
mod session;

pub use error::ClientError;
pub use reqwest::Method;
pub use retry::{
    DEFAULT_BACKOFF_BASE, DEFAULT_MAX_ATTEMPTS, FailureType, RetryDecision, RetryPolicy,
    classify_error,
};
pub use session::{DEFAULT_REQUEST_TIMEOUT_SECS, LOGIN_PATH, SessionClient, SessionConfig};
