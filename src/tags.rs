//! Idempotent tag application on top of [`SessionClient`].
//!
//! [`TagService::ensure_tag`] reads the torrent's current tags and only issues
//! the `addTags` mutation when the tag is missing. The read and the write are
//! two separate calls, so a concurrent external edit between them can race;
//! with one torrent per invocation that window is accepted.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::client::{ClientError, SessionClient};

/// Torrent metadata endpoint.
pub const TORRENT_INFO_PATH: &str = "/api/v2/torrents/info";

/// Tag mutation endpoint.
pub const ADD_TAGS_PATH: &str = "/api/v2/torrents/addTags";

/// Subset of the torrent metadata returned by `torrents/info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TorrentInfo {
    /// Info hash.
    #[serde(default)]
    pub hash: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Comma-separated tag list.
    #[serde(default)]
    pub tags: String,
}

impl TorrentInfo {
    /// Parsed tag set.
    #[must_use]
    pub fn tag_set(&self) -> BTreeSet<String> {
        parse_tag_list(&self.tags)
    }
}

/// Splits a comma-delimited tag field into trimmed, non-empty tags.
#[must_use]
pub fn parse_tag_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Reads and applies torrent tags.
#[derive(Debug, Clone)]
pub struct TagService {
    session: Arc<SessionClient>,
}

impl TagService {
    /// Creates a tag service over a shared session.
    #[must_use]
    pub fn new(session: Arc<SessionClient>) -> Self {
        Self { session }
    }

    /// Fetches metadata for one torrent, or `None` if the hash is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidResponse`] when the body is not a JSON
    /// array of torrents, plus any error from the underlying request.
    #[instrument(skip(self))]
    pub async fn torrent_info(&self, hash: &str) -> Result<Option<TorrentInfo>, ClientError> {
        let body = self.session.get(TORRENT_INFO_PATH, &[("hashes", hash)]).await?;
        let torrents: Vec<TorrentInfo> = serde_json::from_str(&body)
            .map_err(|source| ClientError::invalid_response(TORRENT_INFO_PATH, source))?;
        Ok(torrents.into_iter().next())
    }

    /// Returns the tags currently attached to a torrent.
    ///
    /// An unknown hash yields an empty set.
    ///
    /// # Errors
    ///
    /// See [`torrent_info`](Self::torrent_info).
    pub async fn existing_tags(&self, hash: &str) -> Result<BTreeSet<String>, ClientError> {
        Ok(self
            .torrent_info(hash)
            .await?
            .as_ref()
            .map(TorrentInfo::tag_set)
            .unwrap_or_default())
    }

    /// Adds `tag` to the torrent unless it is already present.
    ///
    /// Returns `true` if the mutation was issued, `false` if the tag was
    /// already attached and nothing was sent.
    ///
    /// # Errors
    ///
    /// Returns any [`ClientError`] from the metadata fetch or the mutation.
    #[instrument(skip(self))]
    pub async fn ensure_tag(&self, hash: &str, tag: &str) -> Result<bool, ClientError> {
        let existing = self.existing_tags(hash).await?;
        if existing.contains(tag) {
            debug!(?existing, "tag already present");
            return Ok(false);
        }

        self.session
            .post_form(ADD_TAGS_PATH, &[("hashes", hash), ("tags", tag)])
            .await?;
        info!(hash, tag, "Tag added");
        Ok(true)
    }
}
