//! Error type for `skein-reddit`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("GET {endpoint} → {status}")]
  Status { endpoint: String, status: StatusCode },

  #[error("token request → {0}")]
  Auth(StatusCode),

  #[error("subreddit not found: {0}")]
  SubredditNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
