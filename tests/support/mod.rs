//! Shared qBittorrent mock helpers for integration tests.
//!
//! Each test binary pulls in what it needs; unused helpers are expected.
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use auto_tagger_core::{RetryPolicy, SessionConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const LOGIN_PATH: &str = "/api/v2/auth/login";
pub const INFO_PATH: &str = "/api/v2/torrents/info";
pub const ADD_TAGS_PATH: &str = "/api/v2/torrents/addTags";

pub const HASH: &str = "abc123";
pub const SESSION_COOKIE: &str = "SID=test-sid";

/// Per-attempt timeout used by tests; mock delays exceed it to force a timeout.
pub const TEST_TIMEOUT: Duration = Duration::from_millis(200);
pub const SLOW_RESPONSE: Duration = Duration::from_secs(2);

/// Session config pointed at the mock with short timeouts and millisecond backoff.
pub fn fast_config(uri: &str, max_attempts: u32) -> SessionConfig {
    SessionConfig::new(uri, "admin", "adminadmin")
        .with_request_timeout(TEST_TIMEOUT)
        .with_retry_policy(
            RetryPolicy::new(max_attempts, 2.0).with_backoff_unit(Duration::from_millis(1)),
        )
}

/// Mounts a login endpoint that accepts any credentials and sets the SID cookie.
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "SID=test-sid; HttpOnly; path=/")
                .set_body_string("Ok."),
        )
        .mount(server)
        .await;
}

/// JSON body for `torrents/info` with a single torrent carrying `tags`.
pub fn torrent_json(tags: &str) -> String {
    serde_json::json!([{ "hash": HASH, "name": "Some torrent", "tags": tags }]).to_string()
}

/// Responder that stalls the first `fail_count` requests past the client timeout.
pub struct FlakyResponder {
    request_count: Arc<AtomicUsize>,
    fail_count: usize,
    success_body: String,
}

impl FlakyResponder {
    pub fn new(fail_count: usize, success_body: impl Into<String>) -> Self {
        Self {
            request_count: Arc::new(AtomicUsize::new(0)),
            fail_count,
            success_body: success_body.into(),
        }
    }
}

impl Respond for FlakyResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.request_count.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_count {
            ResponseTemplate::new(200)
                .set_delay(SLOW_RESPONSE)
                .set_body_string(self.success_body.clone())
        } else {
            ResponseTemplate::new(200).set_body_string(self.success_body.clone())
        }
    }
}

/// In-memory torrent tag state shared by the info and addTags responders.
#[derive(Clone, Default)]
pub struct TagState {
    tags: Arc<Mutex<BTreeSet<String>>>,
}

impl TagState {
    pub fn with_tags(tags: &[&str]) -> Self {
        let state = Self::default();
        state
            .tags
            .lock()
            .unwrap()
            .extend(tags.iter().map(ToString::to_string));
        state
    }

    pub fn tags(&self) -> BTreeSet<String> {
        self.tags.lock().unwrap().clone()
    }

    /// Mounts `torrents/info` and `torrents/addTags` backed by this state.
    pub async fn mount(&self, server: &MockServer) {
        Mock::given(method("GET"))
            .and(path(INFO_PATH))
            .respond_with(InfoResponder(self.clone()))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path(ADD_TAGS_PATH))
            .respond_with(AddTagsResponder(self.clone()))
            .mount(server)
            .await;
    }
}

struct InfoResponder(TagState);

impl Respond for InfoResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let joined = self.0.tags().into_iter().collect::<Vec<_>>().join(", ");
        ResponseTemplate::new(200).set_body_string(torrent_json(&joined))
    }
}

struct AddTagsResponder(TagState);

impl Respond for AddTagsResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body = String::from_utf8_lossy(&request.body).to_string();
        let tags = url::form_urlencoded::parse(body.as_bytes())
            .find(|(key, _)| key == "tags")
            .map(|(_, value)| value.to_string());
        if let Some(tag) = tags {
            self.0.tags.lock().unwrap().insert(tag);
        }
        ResponseTemplate::new(200)
    }
}

/// Returns a local port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
