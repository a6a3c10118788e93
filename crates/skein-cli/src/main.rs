//! `skein`: ingest a subreddit's recent threads into a local store and print
//! their comment trees.
//!
//! # Usage
//!
//! ```
//! skein --lookback-date 2024-05-01 --subreddit rust
//! skein --lookback-date 2024-05-01 --subreddit-url https://www.reddit.com/r/rust/
//! skein --config ~/.config/skein/config.toml --lookback-date 2024-05-01 --subreddit rust
//! ```
//!
//! Reddit credentials and the store path come from the settings file and
//! `SKEIN_*` environment variables (see [`settings::Settings`]).

mod cli;
mod settings;
mod ui;

use std::io;

use anyhow::{Context as _, Result};
use chrono::NaiveDateTime;
use clap::Parser;
use cli::Args;
use settings::Settings;
use skein_core::{ingest::Ingestor, render::render};
use skein_reddit::RedditClient;
use skein_store_sqlite::SqliteStore;
use tracing::{debug, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;
use ui::TerminalSink;

#[tokio::main]
async fn main() -> Result<()> {
  // Logs go to stderr so they never interleave with the printed tree.
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  dotenvy::dotenv().ok();
  let settings = Settings::load(args.config.as_deref())?;

  let subreddit = args.subreddit_name();
  let cutoff = args.cutoff();

  if !args.skip_ingest {
    ingest(&settings, subreddit, cutoff).await?;
  }
  show(&settings, subreddit, cutoff).await
}

async fn open_store(settings: &Settings) -> Result<SqliteStore> {
  SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))
}

async fn ingest(settings: &Settings, subreddit: &str, cutoff: NaiveDateTime) -> Result<()> {
  let client = RedditClient::new(settings.reddit()).context("failed to build Reddit client")?;
  let store = open_store(settings).await?;

  let result = Ingestor::new(client).ingest(subreddit, cutoff, &store).await;
  let closed = store.close().await;

  result.with_context(|| format!("failed to ingest r/{subreddit}"))?;
  closed.context("failed to close store after ingest")?;
  Ok(())
}

async fn show(settings: &Settings, subreddit: &str, cutoff: NaiveDateTime) -> Result<()> {
  let store = open_store(settings).await?;
  let mut sink = TerminalSink::new().context("failed to set up terminal output")?;

  let result = render(&store, subreddit, cutoff, &mut sink).await;
  let closed = store.close().await;

  let outcome = result.context("failed to render threads")?;
  closed.context("failed to close store after render")?;
  debug!(?outcome, "render finished");
  Ok(())
}
