//! Auto-Tagger Core Library
//!
//! This library classifies newly added torrents by name and applies the
//! resulting tag through the qBittorrent Web API.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`rules`] - Ordered include/exclude pattern rules, first match wins
//! - [`client`] - Authenticated API session with retry and backoff
//! - [`tags`] - Fetch-then-add tag application, skipping tags already present
//! - [`pool`] - Bounded task pool for API work
//! - [`orchestrator`] - Classify one torrent and tag it

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod orchestrator;
pub mod pool;
pub mod rules;
pub mod tags;
mod user_agent;

// Re-export commonly used types
pub use client::{ClientError, RetryPolicy, SessionClient, SessionConfig};
pub use orchestrator::{Item, Orchestrator, ProcessError, TagOutcome};
pub use pool::{DEFAULT_WORKER_COUNT, PoolError, WorkerPool};
pub use rules::{PatternSet, Rule, RuleError, RuleSet, RuleSpec, default_rules};
pub use tags::{TagService, TorrentInfo, parse_tag_list};
