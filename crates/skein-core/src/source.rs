//! The `ThreadSource` trait and the native records it yields.
//!
//! The trait is implemented by remote backends (e.g. `skein-reddit`). The
//! ingestion pipeline depends on this abstraction, not on any HTTP client.

use std::future::Future;

/// Fullname prefix of a comment.
pub const COMMENT_PREFIX: &str = "t1_";
/// Fullname prefix of a thread (link).
pub const THREAD_PREFIX: &str = "t3_";
/// Fullname prefix of a subreddit.
pub const SUBREDDIT_PREFIX: &str = "t5_";

// ─── Native records ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSubreddit {
  pub id:           String,
  pub display_name: String,
}

/// One item of a subreddit listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceThread {
  pub id:           String,
  /// Prefixed id (`t3_…`); doubles as the pagination cursor.
  pub fullname:     String,
  /// Short id of the owning subreddit.
  pub subreddit_id: String,
  pub title:        String,
  pub selftext:     String,
  /// Absolute link target; equals the permalink for self posts.
  pub url:          String,
  /// Path relative to the site root, e.g. `/r/rust/comments/abc/title/`.
  pub permalink:    String,
  pub is_self:      bool,
  pub author:       Option<String>,
  pub score:        i64,
  pub created_utc:  i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceComment {
  pub id:          String,
  /// Raw parent reference: `t1_…` for a comment, `t3_…` for the thread.
  pub parent_id:   Option<String>,
  pub author:      Option<String>,
  pub score:       i64,
  pub created_utc: i64,
  pub body:        String,
}

/// A "load more comments" placeholder inside a comment forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoreComments {
  pub id:        String,
  pub parent_id: String,
  pub count:     i64,
  /// Ids of the hidden comments. Empty for a "continue this thread" stub,
  /// which stands for the whole remaining subtree under `parent_id`.
  pub children:  Vec<String>,
}

impl MoreComments {
  pub fn is_continuation(&self) -> bool { self.children.is_empty() }

  /// Identity used to detect a placeholder being served twice.
  ///
  /// Continuation stubs all share the id `_`, so they are keyed by parent.
  pub fn key(&self) -> String {
    if self.is_continuation() {
      format!("{}/continue", self.parent_id)
    } else {
      self.id.clone()
    }
  }
}

/// A node in a (possibly truncated) comment forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForestNode {
  Comment {
    comment: SourceComment,
    replies: Vec<ForestNode>,
  },
  More(MoreComments),
}

impl ForestNode {
  /// A comment with no loaded replies.
  pub fn leaf(comment: SourceComment) -> Self {
    Self::Comment { comment, replies: Vec::new() }
  }

  pub fn parent_id(&self) -> Option<&str> {
    match self {
      Self::Comment { comment, .. } => comment.parent_id.as_deref(),
      Self::More(more) => Some(&more.parent_id),
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the remote platform that threads are ingested from.
///
/// Listings are newest first. Every call is a blocking round-trip from the
/// pipeline's point of view; there is no prefetch.
pub trait ThreadSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Resolve a subreddit by name.
  fn subreddit<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<SourceSubreddit, Self::Error>> + Send + 'a;

  /// One page of the "new" listing, starting after the thread fullname
  /// `after` (or at the newest thread when `None`). An empty page means the
  /// listing is exhausted.
  fn new_threads<'a>(
    &'a self,
    name: &'a str,
    after: Option<&'a str>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<SourceThread>, Self::Error>> + Send + 'a;

  /// The top-level comment forest of a thread as first served, placeholders
  /// included.
  fn comment_forest<'a>(
    &'a self,
    thread: &'a SourceThread,
  ) -> impl Future<Output = Result<Vec<ForestNode>, Self::Error>> + Send + 'a;

  /// Load the comments hidden behind a placeholder.
  ///
  /// Returned nodes may be flat (each carrying its own `parent_id`) and may
  /// themselves contain further placeholders.
  fn more_children<'a>(
    &'a self,
    thread: &'a SourceThread,
    more: &'a MoreComments,
  ) -> impl Future<Output = Result<Vec<ForestNode>, Self::Error>> + Send + 'a;
}
