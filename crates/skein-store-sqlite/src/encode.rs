//! Encoding and decoding helpers between record models and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as `YYYY-MM-DD HH:MM:SS` strings so that text
//! comparison orders them chronologically.

use chrono::NaiveDateTime;
use skein_core::model::{Comment, DATE_FORMAT, Thread};

use crate::{Error, Result};

// ─── NaiveDateTime ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: &NaiveDateTime) -> String { dt.format(DATE_FORMAT).to_string() }

pub fn decode_dt(s: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `threads` row.
pub struct RawThread {
  pub id:           String,
  pub subreddit_id: String,
  pub title:        String,
  pub text:         Option<String>,
  pub external_url: Option<String>,
  pub url:          String,
  pub username:     Option<String>,
  pub upvotes:      i64,
  pub date_posted:  String,
}

impl RawThread {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get("id")?,
      subreddit_id: row.get("subreddit_id")?,
      title:        row.get("title")?,
      text:         row.get("text")?,
      external_url: row.get("external_url")?,
      url:          row.get("url")?,
      username:     row.get("username")?,
      upvotes:      row.get("upvotes")?,
      date_posted:  row.get("date_posted")?,
    })
  }

  pub fn into_thread(self) -> Result<Thread> {
    Ok(Thread {
      date_posted:  decode_dt(&self.date_posted)?,
      id:           self.id,
      subreddit_id: self.subreddit_id,
      title:        self.title,
      text:         self.text,
      external_url: self.external_url,
      url:          self.url,
      username:     self.username,
      upvotes:      self.upvotes,
      comments:     Vec::new(),
    })
  }
}

/// Raw values read directly from a `comments` row.
pub struct RawComment {
  pub id:                String,
  pub thread_id:         String,
  pub parent_comment_id: Option<String>,
  pub username:          Option<String>,
  pub upvotes:           i64,
  pub date_posted:       String,
  pub text:              String,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get("id")?,
      thread_id:         row.get("thread_id")?,
      parent_comment_id: row.get("parent_comment_id")?,
      username:          row.get("username")?,
      upvotes:           row.get("upvotes")?,
      date_posted:       row.get("date_posted")?,
      text:              row.get("text")?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      date_posted:       decode_dt(&self.date_posted)?,
      id:                self.id,
      thread_id:         self.thread_id,
      parent_comment_id: self.parent_comment_id,
      username:          self.username,
      upvotes:           self.upvotes,
      text:              self.text,
    })
  }
}
