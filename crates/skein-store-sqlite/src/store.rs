//! [`SqliteStore`]: the SQLite implementation of [`ThreadStore`].

use std::path::Path;

use chrono::NaiveDateTime;
use rusqlite::OptionalExtension as _;
use tracing::debug;

use skein_core::{
  model::{Comment, Subreddit, Thread},
  store::ThreadStore,
};

use crate::{
  Result,
  encode::{RawComment, RawThread, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A skein thread store backed by a single SQLite file.
///
/// The store owns one connection for its whole life. It is released by
/// [`SqliteStore::close`], or on drop along any other exit path.
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the connection, surfacing any error SQLite reports while doing so.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    debug!("store connection closed");
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ThreadStore impl ────────────────────────────────────────────────────────

impl ThreadStore for SqliteStore {
  type Error = crate::Error;

  // ── Unit of work ──────────────────────────────────────────────────────────

  async fn begin(&self) -> Result<()> { self.execute_batch("BEGIN IMMEDIATE").await }

  async fn commit(&self) -> Result<()> { self.execute_batch("COMMIT").await }

  async fn rollback(&self) -> Result<()> { self.execute_batch("ROLLBACK").await }

  // ── Upserts ───────────────────────────────────────────────────────────────

  async fn upsert_subreddit(&self, subreddit: &Subreddit) -> Result<()> {
    let id   = subreddit.id.clone();
    let name = subreddit.name.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subreddits (id, name) VALUES (?1, ?2)
           ON CONFLICT (id) DO UPDATE SET name = excluded.name",
          rusqlite::params![id, name],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn upsert_thread(&self, thread: &Thread) -> Result<()> {
    let id           = thread.id.clone();
    let subreddit_id = thread.subreddit_id.clone();
    let title        = thread.title.clone();
    let text         = thread.text.clone();
    let external_url = thread.external_url.clone();
    let url          = thread.url.clone();
    let username     = thread.username.clone();
    let upvotes      = thread.upvotes;
    let date_posted  = encode_dt(&thread.date_posted);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO threads (
             id, subreddit_id, title, text, external_url, url,
             username, upvotes, date_posted
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
           ON CONFLICT (id) DO UPDATE SET
             upvotes = excluded.upvotes,
             title   = excluded.title,
             url     = excluded.url,
             text    = excluded.text",
          rusqlite::params![
            id,
            subreddit_id,
            title,
            text,
            external_url,
            url,
            username,
            upvotes,
            date_posted,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn upsert_comments(&self, comments: &[Comment]) -> Result<()> {
    if comments.is_empty() {
      return Ok(());
    }

    let rows: Vec<(Comment, String)> = comments
      .iter()
      .map(|c| (c.clone(), encode_dt(&c.date_posted)))
      .collect();

    self
      .conn
      .call(move |conn| {
        // A savepoint nests inside an open unit of work and still makes the
        // batch atomic when there is none.
        let sp = conn.savepoint()?;
        {
          let mut stmt = sp.prepare_cached(
            "INSERT INTO comments (
               id, thread_id, parent_comment_id, username, upvotes, date_posted, text
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (id) DO UPDATE SET
               upvotes = excluded.upvotes,
               text    = excluded.text",
          )?;
          for (c, date_posted) in &rows {
            stmt.execute(rusqlite::params![
              c.id,
              c.thread_id,
              c.parent_comment_id,
              c.username,
              c.upvotes,
              date_posted,
              c.text,
            ])?;
          }
        }
        sp.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn find_subreddit_id(&self, name: &str) -> Result<Option<String>> {
    let name = name.to_owned();

    let id = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id FROM subreddits WHERE name = ?1",
              rusqlite::params![name],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(id)
  }

  async fn list_threads(&self, subreddit_id: &str, since: NaiveDateTime) -> Result<Vec<Thread>> {
    let subreddit_id = subreddit_id.to_owned();
    let since_str    = encode_dt(&since);

    let raws: Vec<RawThread> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, subreddit_id, title, text, external_url, url,
                  username, upvotes, date_posted
           FROM threads
           WHERE subreddit_id = ?1 AND date_posted >= ?2
           ORDER BY date_posted DESC, id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![subreddit_id, since_str], RawThread::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawThread::into_thread).collect()
  }

  async fn list_comments(&self, thread_id: &str) -> Result<Vec<Comment>> {
    let thread_id = thread_id.to_owned();

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, thread_id, parent_comment_id, username, upvotes, date_posted, text
           FROM comments
           WHERE thread_id = ?1
           ORDER BY date_posted ASC, id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![thread_id], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }
}
