//! The `DisplaySink` trait and the view types handed to it.

use std::fmt;

use chrono::NaiveDateTime;

use crate::{
  model::{Thread, author_label, format_date},
  tree::CommentTree,
};

/// Informational messages for lookups that come back empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
  SubredditNotFound { name: String },
  NoThreads { name: String, since: NaiveDateTime },
}

impl fmt::Display for Notice {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::SubredditNotFound { name } => {
        write!(f, "Subreddit '{name}' not found in the database.")
      }
      Self::NoThreads { name, since } => write!(
        f,
        "No threads found for subreddit '{name}' since {}.",
        format_date(since)
      ),
    }
  }
}

/// What the header block of one thread shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPanel {
  /// `"<title> (by <author>)"`.
  pub heading:      String,
  pub upvotes:      i64,
  pub posted:       String,
  /// Self-text, only when non-empty.
  pub body:         Option<String>,
  pub external_url: Option<String>,
  pub url:          String,
}

impl From<&Thread> for ThreadPanel {
  fn from(thread: &Thread) -> Self {
    Self {
      heading:      format!(
        "{} (by {})",
        thread.title,
        author_label(thread.username.as_deref())
      ),
      upvotes:      thread.upvotes,
      posted:       format_date(&thread.date_posted),
      body:         thread.text.clone().filter(|t| !t.is_empty()),
      external_url: thread.external_url.clone(),
      url:          thread.url.clone(),
    }
  }
}

/// Where rendered threads go. The sink holds no state the renderer reads.
pub trait DisplaySink {
  type Error: std::error::Error + Send + Sync + 'static;

  fn notice(&mut self, notice: &Notice) -> Result<(), Self::Error>;

  fn thread(&mut self, panel: &ThreadPanel) -> Result<(), Self::Error>;

  /// Called once per thread that has at least one comment.
  fn comments(&mut self, tree: &CommentTree) -> Result<(), Self::Error>;
}
