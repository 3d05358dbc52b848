//! Authenticated session against the qBittorrent Web API.
//!
//! [`SessionClient::connect`] logs in once; the `SID` cookie returned by the
//! server is kept in a cookie jar owned by the client and resent on every
//! later request. The client is cheap to clone and safe to share between
//! tasks: clones share the connection pool and the cookie jar.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use tracing::{debug, info, instrument, warn};
use url::Url;
use url::form_urlencoded;

use super::error::ClientError;
use super::retry::{RetryDecision, RetryPolicy, classify_error};
use crate::user_agent;

/// Default per-attempt request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Login endpoint.
pub const LOGIN_PATH: &str = "/api/v2/auth/login";

/// Body the login endpoint returns on success.
const LOGIN_SUCCESS: &str = "Ok.";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Connection settings for a [`SessionClient`].
#[derive(Clone)]
pub struct SessionConfig {
    /// Base URL of the Web UI, e.g. `http://localhost:8080`.
    pub host: String,
    /// Web UI username.
    pub username: String,
    /// Web UI password.
    pub password: String,
    /// Bound on each individual attempt.
    pub request_timeout: Duration,
    /// Attempt budget and backoff for network failures.
    pub retry: RetryPolicy,
}

impl SessionConfig {
    /// Creates a config with the default timeout and retry policy.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Logged-in HTTP client for the qBittorrent Web API.
#[derive(Debug, Clone)]
pub struct SessionClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

/// Outcome of a single attempt, before retry classification.
enum AttemptError {
    Status(StatusCode),
    Network(reqwest::Error),
}

impl SessionClient {
    /// Builds the client and logs in.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidHost`] if `host` is not an http(s) base URL
    /// - [`ClientError::Auth`] if the login response is anything but `Ok.`
    /// - [`ClientError::Transport`] if the server stays unreachable
    #[instrument(skip(config), fields(host = %config.host, username = %config.username))]
    pub async fn connect(config: &SessionConfig) -> Result<Self, ClientError> {
        let base_url = normalize_host(&config.host)?;
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(jar)
            .timeout(config.request_timeout)
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(|source| ClientError::Build { source })?;

        let session = Self {
            client,
            base_url,
            retry: config.retry.clone(),
        };
        session.login(&config.username, &config.password).await?;
        Ok(session)
    }

    /// Base URL requests are issued against, without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues a `GET` with query parameters.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<String, ClientError> {
        self.request(Method::GET, path, params, None).await
    }

    /// Issues a form-encoded `POST`.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn post_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<String, ClientError> {
        self.request(Method::POST, path, &[], Some(form)).await
    }

    /// Executes a request with retry and returns the response body.
    ///
    /// Network-level failures are retried with exponential backoff up to the
    /// policy's attempt budget. A non-success status is returned immediately.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Transport`] wrapping the last error once attempts are exhausted
    /// - [`ClientError::HttpStatus`] for any non-2xx response
    /// - [`ClientError::InvalidHost`] if the path cannot be joined to the host
    #[instrument(skip(self, method, params, form), fields(method = %method))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        form: Option<&[(&str, &str)]>,
    ) -> Result<String, ClientError> {
        let url = self.endpoint(path, params)?;
        let body = form.map(encode_form);

        let mut attempt: u32 = 1;
        loop {
            match self.send_once(method.clone(), url.clone(), body.clone()).await {
                Ok(text) => {
                    debug!(attempt, bytes = text.len(), "request succeeded");
                    return Ok(text);
                }
                Err(AttemptError::Status(status)) => {
                    warn!(status = status.as_u16(), "API returned error status");
                    return Err(ClientError::http_status(path, status.as_u16()));
                }
                Err(AttemptError::Network(error)) => {
                    match self.retry.should_retry(classify_error(&error), attempt) {
                        RetryDecision::Retry {
                            delay,
                            attempt: next,
                        } => {
                            warn!(
                                attempt,
                                delay_ms = delay.as_millis(),
                                error = %error,
                                "request failed, retrying"
                            );
                            tokio::time::sleep(delay).await;
                            attempt = next;
                        }
                        RetryDecision::DoNotRetry { reason } => {
                            warn!(attempt, %reason, error = %error, "request failed");
                            return Err(ClientError::transport(path, attempt, error));
                        }
                    }
                }
            }
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: Url,
        body: Option<String>,
    ) -> Result<String, AttemptError> {
        let mut builder = self.client.request(method, url);
        if let Some(body) = body {
            builder = builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE).body(body);
        }

        let response = builder.send().await.map_err(AttemptError::Network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status));
        }
        response.text().await.map_err(AttemptError::Network)
    }

    #[instrument(skip(self, password))]
    async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let form = [("username", username), ("password", password)];
        let body = match self.post_form(LOGIN_PATH, &form).await {
            Ok(body) => body,
            Err(ClientError::HttpStatus { status, .. }) => {
                return Err(ClientError::auth(format!("HTTP {status}")));
            }
            Err(other) => return Err(other),
        };

        let body = body.trim();
        if body != LOGIN_SUCCESS {
            return Err(ClientError::auth(body));
        }
        info!(host = %self.base_url, "Logged in to qBittorrent");
        Ok(())
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = Url::parse(&format!("{}{path}", self.base_url))
            .map_err(|_| ClientError::invalid_host(&self.base_url))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }
}

fn encode_form(form: &[(&str, &str)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form)
        .finish()
}

/// Validates the host and strips trailing slashes.
fn normalize_host(host: &str) -> Result<String, ClientError> {
    let trimmed = host.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|_| ClientError::invalid_host(host))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
        return Err(ClientError::invalid_host(host));
    }
    Ok(trimmed.to_string())
}
