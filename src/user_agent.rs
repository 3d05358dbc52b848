//! Shared User-Agent string for API requests.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/auto-tagger";

/// Default User-Agent for qBittorrent API requests (identifies the tool).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("auto-tagger/{version} (+{PROJECT_UA_URL})")
}
