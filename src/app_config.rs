//! Application configuration loading for connection settings and the rule table.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use auto_tagger_core::client::{
    DEFAULT_BACKOFF_BASE, DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use auto_tagger_core::{DEFAULT_WORKER_COUNT, RetryPolicy, RuleSpec, SessionConfig, default_rules};
use serde::Deserialize;

pub const DEFAULT_HOST: &str = "http://localhost:8080";
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "adminadmin";

/// TOML-backed file configuration. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Base URL of the qBittorrent Web UI.
    pub host: Option<String>,
    /// Web UI username.
    pub username: Option<String>,
    /// Web UI password.
    pub password: Option<String>,
    /// Per-attempt request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Total attempts per request.
    pub max_attempts: Option<u32>,
    /// Exponential backoff base.
    pub backoff_base: Option<f64>,
    /// Worker pool size.
    pub worker_count: Option<usize>,
    /// Ordered rule table; replaces the built-in rules when present.
    pub rules: Option<Vec<RuleSpec>>,
}

impl FileConfig {
    /// Validates config values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(timeout) = self.request_timeout_secs
            && !(1..=300).contains(&timeout)
        {
            bail!(
                "Invalid config value for `request_timeout_secs`: {timeout}. Expected range: 1..=300"
            );
        }

        if let Some(attempts) = self.max_attempts
            && !(1..=20).contains(&attempts)
        {
            bail!("Invalid config value for `max_attempts`: {attempts}. Expected range: 1..=20");
        }

        if let Some(base) = self.backoff_base
            && !(base.is_finite() && (1.0..=10.0).contains(&base))
        {
            bail!("Invalid config value for `backoff_base`: {base}. Expected range: 1.0..=10.0");
        }

        if let Some(workers) = self.worker_count
            && !(1..=64).contains(&workers)
        {
            bail!("Invalid config value for `worker_count`: {workers}. Expected range: 1..=64");
        }

        if let Some(host) = &self.host
            && host.trim().is_empty()
        {
            bail!("Invalid config value for `host`: must not be empty");
        }

        Ok(())
    }
}

/// Connection settings given on the command line; these win over the file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub session: SessionConfig,
    pub worker_count: usize,
    pub rules: Vec<RuleSpec>,
}

impl Settings {
    /// Merges defaults, the optional file config and CLI overrides.
    pub fn from_sources(file: Option<&FileConfig>, overrides: CliOverrides) -> Self {
        let file = file.cloned().unwrap_or_default();

        let host = overrides
            .host
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let username = overrides
            .username
            .or(file.username)
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string());
        let password = overrides
            .password
            .or(file.password)
            .unwrap_or_else(|| DEFAULT_PASSWORD.to_string());

        let retry = RetryPolicy::new(
            file.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            file.backoff_base.unwrap_or(DEFAULT_BACKOFF_BASE),
        );
        let timeout = Duration::from_secs(
            file.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        );

        Self {
            session: SessionConfig::new(host, username, password)
                .with_request_timeout(timeout)
                .with_retry_policy(retry),
            worker_count: file.worker_count.unwrap_or(DEFAULT_WORKER_COUNT),
            rules: file.rules.unwrap_or_else(default_rules),
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if one was known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/auto-tagger/config.toml`
/// 2. `$HOME/.config/auto-tagger/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("auto-tagger")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("auto-tagger")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the explicit config file, or the default one if present.
///
/// An explicit path must exist; a missing default file means built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = load_file_config(path)?;
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config: Some(config),
        });
    }

    let path = resolve_default_config_path();
    let Some(path_ref) = path.as_deref() else {
        return Ok(LoadedConfig { path, config: None });
    };

    if !path_ref.exists() {
        return Ok(LoadedConfig { path, config: None });
    }

    let config = load_file_config(path_ref)?;
    Ok(LoadedConfig {
        path,
        config: Some(config),
    })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let cfg: FileConfig = toml::from_str(raw)?;
    cfg.validate()?;
    Ok(cfg)
}
