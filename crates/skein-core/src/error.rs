//! Error types for `skein-core`.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("source error: {0}")]
  Source(#[source] BoxError),

  #[error("store error: {0}")]
  Store(#[source] BoxError),

  #[error("display error: {0}")]
  Display(#[source] BoxError),

  #[error("creation time {0} has no local representation")]
  InvalidTimestamp(i64),
}

impl Error {
  pub(crate) fn from_source<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Source(Box::new(err))
  }

  pub(crate) fn from_store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  pub(crate) fn from_display<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Display(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
