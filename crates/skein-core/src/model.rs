//! Record models: plain data contracts for subreddits, threads and comments.
//!
//! These carry no behaviour. Threads and comments are identified by the
//! short (un-prefixed) ids the source assigns.

use chrono::{Local, NaiveDateTime, TimeZone};

use crate::{Error, Result};

/// Column and display format for `date_posted` values.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subreddit {
  pub id:   String,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
  pub id:           String,
  pub subreddit_id: String,
  pub title:        String,
  /// Self-text body; may be empty for link posts.
  pub text:         Option<String>,
  /// Link target, set only for non-self posts.
  pub external_url: Option<String>,
  /// Canonical permalink.
  pub url:          String,
  /// `None` when the author account is deleted.
  pub username:     Option<String>,
  pub upvotes:      i64,
  pub date_posted:  NaiveDateTime,
  /// Populated during ingestion only; reads from a store leave it empty.
  pub comments:     Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
  pub id:                String,
  pub thread_id:         String,
  /// `None` for a top-level reply to the thread itself.
  pub parent_comment_id: Option<String>,
  pub username:          Option<String>,
  pub upvotes:           i64,
  pub date_posted:       NaiveDateTime,
  pub text:              String,
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

/// Convert epoch seconds to a naive timestamp in local system time.
///
/// Ambiguous local times (DST fold) resolve to the earlier instant.
pub fn local_datetime(epoch_secs: i64) -> Result<NaiveDateTime> {
  Local
    .timestamp_opt(epoch_secs, 0)
    .earliest()
    .map(|dt| dt.naive_local())
    .ok_or(Error::InvalidTimestamp(epoch_secs))
}

pub fn format_date(dt: &NaiveDateTime) -> String { dt.format(DATE_FORMAT).to_string() }

/// Display label for an optional author.
pub fn author_label(username: Option<&str>) -> &str { username.unwrap_or("[deleted]") }
