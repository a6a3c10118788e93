//! Runtime settings: an optional TOML file, then `SKEIN_*` environment
//! variables (a `.env` file is loaded into the environment first).

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use skein_reddit::RedditConfig;

fn default_api_url() -> String { "https://oauth.reddit.com".to_owned() }

fn default_auth_url() -> String { "https://www.reddit.com".to_owned() }

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub reddit_client_id:     String,
  pub reddit_client_secret: String,
  pub user_agent:           String,
  /// SQLite database file; a leading `~/` is expanded.
  pub store_path:           PathBuf,
  #[serde(default = "default_api_url")]
  pub reddit_api_url:       String,
  #[serde(default = "default_auth_url")]
  pub reddit_auth_url:      String,
}

impl Settings {
  pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
    let mut builder = config::Config::builder();
    if let Some(path) = file {
      builder = builder.add_source(config::File::from(path).required(true));
    }
    let settings = builder
      .add_source(config::Environment::with_prefix("SKEIN"))
      .build()
      .context("failed to read settings")?;
    Self::from_config(settings)
  }

  fn from_config(settings: config::Config) -> anyhow::Result<Self> {
    let mut settings: Self = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;
    settings.store_path = expand_tilde(&settings.store_path);
    Ok(settings)
  }

  pub fn reddit(&self) -> RedditConfig {
    RedditConfig {
      client_id:     self.reddit_client_id.clone(),
      client_secret: self.reddit_client_secret.clone(),
      user_agent:    self.user_agent.clone(),
      api_url:       self.reddit_api_url.clone(),
      auth_url:      self.reddit_auth_url.clone(),
    }
  }
}

fn expand_tilde(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), std::env::var_os("HOME")) {
    (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
    _ => path.to_path_buf(),
  }
}
