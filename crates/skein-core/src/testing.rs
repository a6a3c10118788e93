//! In-memory fakes for the source, store and sink traits.

use std::{
  collections::{BTreeMap, HashMap},
  convert::Infallible,
  sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::{
  display::{DisplaySink, Notice, ThreadPanel},
  model::{Comment, Subreddit, Thread, local_datetime},
  source::{ForestNode, MoreComments, SourceComment, SourceSubreddit, SourceThread, ThreadSource},
  store::ThreadStore,
  tree::CommentTree,
};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct FakeError(pub String);

// ─── Builders ────────────────────────────────────────────────────────────────

pub fn local(secs: i64) -> NaiveDateTime { local_datetime(secs).unwrap() }

pub fn source_thread(id: &str, created_utc: i64) -> SourceThread {
  SourceThread {
    id:           id.into(),
    fullname:     format!("t3_{id}"),
    subreddit_id: "sub".into(),
    title:        format!("title of {id}"),
    selftext:     format!("body of {id}"),
    url:          format!("https://reddit.com/r/test/comments/{id}/"),
    permalink:    format!("/r/test/comments/{id}/"),
    is_self:      true,
    author:       Some("author".into()),
    score:        1,
    created_utc,
  }
}

pub fn comment(id: &str, parent_id: &str, created_utc: i64) -> SourceComment {
  SourceComment {
    id:          id.into(),
    parent_id:   Some(parent_id.into()),
    author:      Some("commenter".into()),
    score:       1,
    created_utc,
    body:        format!("comment {id}"),
  }
}

pub fn more(id: &str, parent_id: &str, children: &[&str]) -> MoreComments {
  MoreComments {
    id:        id.into(),
    parent_id: parent_id.into(),
    count:     children.len() as i64,
    children:  children.iter().map(|c| c.to_string()).collect(),
  }
}

pub fn stored_thread(id: &str, secs: i64) -> Thread {
  Thread {
    id:           id.into(),
    subreddit_id: "sub".into(),
    title:        format!("title of {id}"),
    text:         Some(format!("body of {id}")),
    external_url: None,
    url:          format!("https://reddit.com/r/test/comments/{id}/"),
    username:     Some("author".into()),
    upvotes:      1,
    date_posted:  local(secs),
    comments:     Vec::new(),
  }
}

pub fn stored_comment(id: &str, parent: Option<&str>, secs: i64) -> Comment {
  Comment {
    id:                id.into(),
    thread_id:         "t".into(),
    parent_comment_id: parent.map(str::to_owned),
    username:          Some("commenter".into()),
    upvotes:           1,
    date_posted:       local(secs),
    text:              format!("comment {id}"),
  }
}

// ─── Source ──────────────────────────────────────────────────────────────────

/// Serves listing pages in request order, regardless of the cursor.
#[derive(Default)]
pub struct FakeSource {
  pub pages:        Vec<Vec<SourceThread>>,
  pub forests:      HashMap<String, Vec<ForestNode>>,
  /// Placeholder expansions keyed by [`MoreComments::key`].
  pub more:         HashMap<String, Vec<ForestNode>>,
  pub fail_listing: bool,
  cursors:          Mutex<Vec<Option<String>>>,
  more_requests:    AtomicUsize,
}

impl FakeSource {
  pub fn with_pages(pages: Vec<Vec<SourceThread>>) -> Self {
    Self { pages, ..Default::default() }
  }

  pub fn page_requests(&self) -> usize { self.cursors.lock().unwrap().len() }

  pub fn cursors(&self) -> Vec<Option<String>> { self.cursors.lock().unwrap().clone() }

  pub fn more_requests(&self) -> usize { self.more_requests.load(Ordering::SeqCst) }
}

impl ThreadSource for FakeSource {
  type Error = FakeError;

  async fn subreddit(&self, name: &str) -> Result<SourceSubreddit, FakeError> {
    Ok(SourceSubreddit { id: "sub".into(), display_name: name.into() })
  }

  async fn new_threads(
    &self,
    _name: &str,
    after: Option<&str>,
    _limit: usize,
  ) -> Result<Vec<SourceThread>, FakeError> {
    if self.fail_listing {
      return Err(FakeError("listing unavailable".into()));
    }
    let mut cursors = self.cursors.lock().unwrap();
    let page = self.pages.get(cursors.len()).cloned().unwrap_or_default();
    cursors.push(after.map(str::to_owned));
    Ok(page)
  }

  async fn comment_forest(&self, thread: &SourceThread) -> Result<Vec<ForestNode>, FakeError> {
    Ok(self.forests.get(&thread.id).cloned().unwrap_or_default())
  }

  async fn more_children(
    &self,
    _thread: &SourceThread,
    more: &MoreComments,
  ) -> Result<Vec<ForestNode>, FakeError> {
    self.more_requests.fetch_add(1, Ordering::SeqCst);
    self
      .more
      .get(&more.key())
      .cloned()
      .ok_or_else(|| FakeError(format!("no expansion for {}", more.key())))
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct Tables {
  subreddits: BTreeMap<String, Subreddit>,
  threads:    BTreeMap<String, Thread>,
  comments:   BTreeMap<String, Comment>,
  log:        Vec<String>,
}

#[derive(Default)]
struct State {
  tables:    Tables,
  snapshot:  Option<Tables>,
  committed: bool,
}

/// Applies the same upsert field policy as the SQL backends.
#[derive(Default)]
pub struct FakeStore {
  state:         Mutex<State>,
  fail_thread:   Option<String>,
  thread_reads:  AtomicUsize,
  comment_reads: AtomicUsize,
}

impl FakeStore {
  pub fn failing_on_thread(id: &str) -> Self {
    Self { fail_thread: Some(id.into()), ..Default::default() }
  }

  pub fn committed(&self) -> bool { self.state.lock().unwrap().committed }

  pub fn thread_ids(&self) -> Vec<String> {
    self.state.lock().unwrap().tables.threads.keys().cloned().collect()
  }

  pub fn subreddit_count(&self) -> usize { self.state.lock().unwrap().tables.subreddits.len() }

  pub fn write_log(&self) -> Vec<String> { self.state.lock().unwrap().tables.log.clone() }

  pub fn thread_reads(&self) -> usize { self.thread_reads.load(Ordering::SeqCst) }

  pub fn comment_reads(&self) -> usize { self.comment_reads.load(Ordering::SeqCst) }

  pub fn reset_reads(&self) {
    self.thread_reads.store(0, Ordering::SeqCst);
    self.comment_reads.store(0, Ordering::SeqCst);
  }
}

impl ThreadStore for FakeStore {
  type Error = FakeError;

  async fn begin(&self) -> Result<(), FakeError> {
    let mut state = self.state.lock().unwrap();
    state.snapshot = Some(state.tables.clone());
    Ok(())
  }

  async fn commit(&self) -> Result<(), FakeError> {
    let mut state = self.state.lock().unwrap();
    state.snapshot = None;
    state.committed = true;
    Ok(())
  }

  async fn rollback(&self) -> Result<(), FakeError> {
    let mut state = self.state.lock().unwrap();
    if let Some(snapshot) = state.snapshot.take() {
      state.tables = snapshot;
    }
    Ok(())
  }

  async fn upsert_subreddit(&self, subreddit: &Subreddit) -> Result<(), FakeError> {
    let mut state = self.state.lock().unwrap();
    state.tables.log.push(format!("subreddit:{}", subreddit.id));
    state
      .tables
      .subreddits
      .entry(subreddit.id.clone())
      .and_modify(|s| s.name = subreddit.name.clone())
      .or_insert_with(|| subreddit.clone());
    Ok(())
  }

  async fn upsert_thread(&self, thread: &Thread) -> Result<(), FakeError> {
    if self.fail_thread.as_deref() == Some(thread.id.as_str()) {
      return Err(FakeError(format!("write of {} failed", thread.id)));
    }
    let mut state = self.state.lock().unwrap();
    state.tables.log.push(format!("thread:{}", thread.id));
    state
      .tables
      .threads
      .entry(thread.id.clone())
      .and_modify(|t| {
        t.upvotes = thread.upvotes;
        t.title = thread.title.clone();
        t.url = thread.url.clone();
        t.text = thread.text.clone();
      })
      .or_insert_with(|| Thread { comments: Vec::new(), ..thread.clone() });
    Ok(())
  }

  async fn upsert_comments(&self, comments: &[Comment]) -> Result<(), FakeError> {
    let mut state = self.state.lock().unwrap();
    state.tables.log.push(format!("comments:{}", comments.len()));
    for comment in comments {
      state
        .tables
        .comments
        .entry(comment.id.clone())
        .and_modify(|c| {
          c.upvotes = comment.upvotes;
          c.text = comment.text.clone();
        })
        .or_insert_with(|| comment.clone());
    }
    Ok(())
  }

  async fn find_subreddit_id(&self, name: &str) -> Result<Option<String>, FakeError> {
    let state = self.state.lock().unwrap();
    Ok(
      state
        .tables
        .subreddits
        .values()
        .find(|s| s.name == name)
        .map(|s| s.id.clone()),
    )
  }

  async fn list_threads(
    &self,
    subreddit_id: &str,
    since: NaiveDateTime,
  ) -> Result<Vec<Thread>, FakeError> {
    self.thread_reads.fetch_add(1, Ordering::SeqCst);
    let state = self.state.lock().unwrap();
    let mut threads: Vec<Thread> = state
      .tables
      .threads
      .values()
      .filter(|t| t.subreddit_id == subreddit_id && t.date_posted >= since)
      .cloned()
      .collect();
    threads.sort_by(|a, b| b.date_posted.cmp(&a.date_posted));
    Ok(threads)
  }

  async fn list_comments(&self, thread_id: &str) -> Result<Vec<Comment>, FakeError> {
    self.comment_reads.fetch_add(1, Ordering::SeqCst);
    let state = self.state.lock().unwrap();
    let mut comments: Vec<Comment> = state
      .tables
      .comments
      .values()
      .filter(|c| c.thread_id == thread_id)
      .cloned()
      .collect();
    comments.sort_by(|a, b| a.date_posted.cmp(&b.date_posted));
    Ok(comments)
  }
}

// ─── Sink ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
  pub notices: Vec<Notice>,
  pub panels:  Vec<ThreadPanel>,
  /// Comment count of each tree received.
  pub trees:   Vec<usize>,
}

impl DisplaySink for RecordingSink {
  type Error = Infallible;

  fn notice(&mut self, notice: &Notice) -> Result<(), Infallible> {
    self.notices.push(notice.clone());
    Ok(())
  }

  fn thread(&mut self, panel: &ThreadPanel) -> Result<(), Infallible> {
    self.panels.push(panel.clone());
    Ok(())
  }

  fn comments(&mut self, tree: &CommentTree) -> Result<(), Infallible> {
    self.trees.push(tree.len());
    Ok(())
  }
}
