//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use crate::app_config::CliOverrides;

/// Tag newly added qBittorrent torrents by name.
///
/// Meant to be run by qBittorrent on torrent add:
/// `auto-tagger "%N" "%I"`
#[derive(Parser, Debug)]
#[command(name = "auto-tagger")]
#[command(author, version, about)]
pub struct Args {
    /// Torrent display name (qBittorrent `%N`)
    pub name: String,

    /// Torrent info hash (qBittorrent `%I`)
    pub hash: String,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to a TOML config file (defaults to ~/.config/auto-tagger/config.toml)
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// qBittorrent Web UI base URL (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Web UI username (overrides config)
    #[arg(long)]
    pub username: Option<String>,

    /// Web UI password (overrides config)
    #[arg(long)]
    pub password: Option<String>,

    /// Classify only; do not contact qBittorrent
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// Connection settings given on the command line.
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            host: self.host.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}
