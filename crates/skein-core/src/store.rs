//! The `ThreadStore` trait: the persistence gateway used by ingestion and
//! rendering.
//!
//! The trait is implemented by storage backends (e.g. `skein-store-sqlite`).

use std::future::Future;

use chrono::NaiveDateTime;

use crate::model::{Comment, Subreddit, Thread};

/// Abstraction over a relational store of subreddits, threads and comments.
///
/// Writes are upserts keyed on the primary id; only the mutable fields named
/// on each method are overwritten on conflict. Nothing is ever deleted.
pub trait ThreadStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Unit of work ──────────────────────────────────────────────────────

  /// Open a transaction spanning every following write.
  fn begin(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn commit(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn rollback(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Upserts ───────────────────────────────────────────────────────────

  /// Insert a subreddit; on conflict update `name`.
  fn upsert_subreddit<'a>(
    &'a self,
    subreddit: &'a Subreddit,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Insert a thread; on conflict update `upvotes`, `title`, `url` and
  /// `text`. The thread's `comments` are not written.
  fn upsert_thread<'a>(
    &'a self,
    thread: &'a Thread,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Insert each comment; on conflict update `upvotes` and `text`.
  fn upsert_comments<'a>(
    &'a self,
    comments: &'a [Comment],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Exact-match lookup. Returns `None` if not found.
  fn find_subreddit_id<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Threads posted at or after `since`, newest first, with empty
  /// `comments`.
  fn list_threads<'a>(
    &'a self,
    subreddit_id: &'a str,
    since: NaiveDateTime,
  ) -> impl Future<Output = Result<Vec<Thread>, Self::Error>> + Send + 'a;

  /// All comments of a thread, oldest first.
  ///
  /// Reply-tree reconstruction relies on this order.
  fn list_comments<'a>(
    &'a self,
    thread_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + 'a;
}
