//! Classify one torrent and apply its tag.
//!
//! The [`Orchestrator`] owns explicit handles to the compiled [`RuleSet`],
//! the [`TagService`] and the [`WorkerPool`]; nothing is process-global, so
//! tests can build a fresh orchestrator per case.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use crate::client::ClientError;
use crate::pool::{PoolError, WorkerPool};
use crate::rules::RuleSet;
use crate::tags::TagService;

/// A newly added torrent, as passed by qBittorrent (`%N` and `%I`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Display name.
    pub name: String,
    /// Info hash.
    pub hash: String,
}

impl Item {
    /// Creates an item from its name and hash.
    #[must_use]
    pub fn new(name: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash: hash.into(),
        }
    }
}

/// What [`Orchestrator::handle`] did for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    /// No rule matched; nothing was sent to the API.
    NoMatch,
    /// The tag was missing and has been added.
    Applied {
        /// The applied tag.
        tag: String,
    },
    /// The torrent already carried the tag; no mutation was sent.
    AlreadyPresent {
        /// The resolved tag.
        tag: String,
    },
}

impl TagOutcome {
    /// The resolved tag, if any rule matched.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::NoMatch => None,
            Self::Applied { tag } | Self::AlreadyPresent { tag } => Some(tag),
        }
    }
}

impl fmt::Display for TagOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatch => write!(f, "No tag applied"),
            Self::Applied { tag } => write!(f, "Tag '{tag}' applied"),
            Self::AlreadyPresent { tag } => write!(f, "Tag '{tag}' already present, skipping"),
        }
    }
}

/// Errors from processing one item.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The API call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The pooled task could not run to completion.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Wires classification into tag application.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    rules: Arc<RuleSet>,
    tags: Arc<TagService>,
    pool: WorkerPool,
}

impl Orchestrator {
    /// Creates an orchestrator from its collaborators.
    #[must_use]
    pub fn new(rules: Arc<RuleSet>, tags: Arc<TagService>, pool: WorkerPool) -> Self {
        Self { rules, tags, pool }
    }

    /// Classifies the item and ensures its tag is attached.
    ///
    /// The API call runs on the worker pool.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Client`] if the metadata fetch or the mutation
    /// fails, [`ProcessError::Pool`] if the pooled task dies.
    #[instrument(skip(self), fields(name = %item.name, hash = %item.hash))]
    pub async fn handle(&self, item: &Item) -> Result<TagOutcome, ProcessError> {
        let Some(tag) = self.rules.resolve(&item.name).map(str::to_string) else {
            info!("No tag applied");
            return Ok(TagOutcome::NoMatch);
        };

        info!(%tag, "Applying tag");
        let tags = Arc::clone(&self.tags);
        let hash = item.hash.clone();
        let pooled_tag = tag.clone();
        let applied = self
            .pool
            .run(async move { tags.ensure_tag(&hash, &pooled_tag).await })
            .await??;

        let outcome = if applied {
            TagOutcome::Applied { tag }
        } else {
            TagOutcome::AlreadyPresent { tag }
        };
        info!(%outcome, "Item processed");
        Ok(outcome)
    }
}
