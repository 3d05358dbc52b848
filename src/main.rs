//! CLI entry point for the auto-tagger tool.

use std::sync::Arc;

use anyhow::{Context, Result};
use auto_tagger_core::{
    Item, Orchestrator, RuleSet, SessionClient, TagOutcome, TagService, WorkerPool,
};
use clap::Parser;
use tracing::{debug, info};

mod app_config;
mod cli;

use app_config::Settings;
use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(name = %args.name, hash = %args.hash, dry_run = args.dry_run, "CLI arguments parsed");

    let loaded = app_config::load_config(args.config.as_deref())?;
    if let Some(path) = loaded.path.as_deref()
        && loaded.config.is_some()
    {
        info!(path = %path.display(), "Loaded config file");
    }
    let settings = Settings::from_sources(loaded.config.as_ref(), args.overrides());

    // Rule errors are fatal before any network activity
    let rules = RuleSet::compile(&settings.rules).context("Invalid rule table")?;
    let item = Item::new(args.name, args.hash);

    if args.dry_run {
        match rules.resolve(&item.name) {
            Some(tag) => println!("Dry run: would apply tag '{tag}'"),
            None => println!("{}", TagOutcome::NoMatch),
        }
        return Ok(());
    }

    let pool = WorkerPool::new(settings.worker_count)?;
    let session = SessionClient::connect(&settings.session)
        .await
        .context("Failed to connect to qBittorrent")?;
    let tags = TagService::new(Arc::new(session));
    let orchestrator = Orchestrator::new(Arc::new(rules), Arc::new(tags), pool);

    let outcome = orchestrator
        .handle(&item)
        .await
        .with_context(|| format!("Failed to tag torrent {}", item.hash))?;
    println!("{outcome}");

    Ok(())
}
