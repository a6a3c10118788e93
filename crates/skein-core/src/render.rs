//! Read a previously-ingested subreddit back out of a [`ThreadStore`] and
//! hand it to a [`DisplaySink`].

use chrono::NaiveDateTime;
use tracing::debug;

use crate::{
  Error, Result,
  display::{DisplaySink, Notice, ThreadPanel},
  store::ThreadStore,
  tree::CommentTree,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
  NotFound,
  NoThreads,
  Rendered { threads: usize, comments: usize },
}

/// Render every stored thread of `subreddit` posted at or after `since`,
/// each followed by its reply tree.
///
/// An unknown subreddit or an empty thread list is reported to the sink as a
/// [`Notice`] and is not an error.
pub async fn render<T, D>(
  store: &T,
  subreddit: &str,
  since: NaiveDateTime,
  sink: &mut D,
) -> Result<RenderOutcome>
where
  T: ThreadStore,
  D: DisplaySink,
{
  let Some(subreddit_id) = store
    .find_subreddit_id(subreddit)
    .await
    .map_err(Error::from_store)?
  else {
    sink
      .notice(&Notice::SubredditNotFound { name: subreddit.to_owned() })
      .map_err(Error::from_display)?;
    return Ok(RenderOutcome::NotFound);
  };

  let threads = store
    .list_threads(&subreddit_id, since)
    .await
    .map_err(Error::from_store)?;

  if threads.is_empty() {
    sink
      .notice(&Notice::NoThreads { name: subreddit.to_owned(), since })
      .map_err(Error::from_display)?;
    return Ok(RenderOutcome::NoThreads);
  }

  let mut comment_total = 0;
  for thread in &threads {
    sink
      .thread(&ThreadPanel::from(thread))
      .map_err(Error::from_display)?;

    let comments = store
      .list_comments(&thread.id)
      .await
      .map_err(Error::from_store)?;
    debug!(thread = %thread.id, comments = comments.len(), "building reply tree");

    if comments.is_empty() {
      continue;
    }
    comment_total += comments.len();
    sink
      .comments(&CommentTree::build(comments))
      .map_err(Error::from_display)?;
  }

  Ok(RenderOutcome::Rendered { threads: threads.len(), comments: comment_total })
}
