//! Comment-forest expansion, flattening and mapping.
//!
//! A forest as first served by the source is truncated: deep or long reply
//! chains hide behind [`MoreComments`] placeholders. [`collect_comments`]
//! expands every placeholder, flattens the forest breadth-first and maps each
//! native comment into a [`Comment`] record.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, warn};

use crate::{
  Error, Result,
  model::{Comment, local_datetime},
  source::{COMMENT_PREFIX, ForestNode, MoreComments, SourceComment, SourceThread, ThreadSource},
};

/// Fetch, fully expand, flatten and map the comments of `thread`.
pub async fn collect_comments<S: ThreadSource>(
  source: &S,
  thread: &SourceThread,
) -> Result<Vec<Comment>> {
  let mut forest = source
    .comment_forest(thread)
    .await
    .map_err(Error::from_source)?;

  expand_forest(source, thread, &mut forest).await?;

  flatten(forest)
    .into_iter()
    .map(|comment| map_comment(comment, &thread.id))
    .collect()
}

// ─── Expansion ───────────────────────────────────────────────────────────────

/// Replace every placeholder in `forest` with the comments behind it, until
/// none remain.
///
/// A placeholder served again after it was already expanded is dropped.
pub async fn expand_forest<S: ThreadSource>(
  source: &S,
  thread: &SourceThread,
  forest: &mut Vec<ForestNode>,
) -> Result<()> {
  let mut expanded: HashSet<String> = HashSet::new();

  loop {
    let pending = take_placeholders(forest);
    if pending.is_empty() {
      return Ok(());
    }

    for more in pending {
      if !expanded.insert(more.key()) {
        warn!(thread = %thread.id, placeholder = %more.key(), "placeholder served twice; dropping");
        continue;
      }

      debug!(
        thread = %thread.id,
        parent = %more.parent_id,
        hidden = more.count,
        "expanding placeholder"
      );
      let nodes = source
        .more_children(thread, &more)
        .await
        .map_err(Error::from_source)?;

      for node in nodes {
        attach(forest, node);
      }
    }
  }
}

/// Remove every placeholder from the forest, at any depth.
fn take_placeholders(nodes: &mut Vec<ForestNode>) -> Vec<MoreComments> {
  let mut taken = Vec::new();
  let mut kept = Vec::with_capacity(nodes.len());

  for node in nodes.drain(..) {
    match node {
      ForestNode::More(more) => taken.push(more),
      ForestNode::Comment { comment, mut replies } => {
        taken.extend(take_placeholders(&mut replies));
        kept.push(ForestNode::Comment { comment, replies });
      }
    }
  }

  *nodes = kept;
  taken
}

/// Insert `node` under the comment its parent reference names, or at the top
/// level when the parent is the thread or is not in the forest.
fn attach(forest: &mut Vec<ForestNode>, node: ForestNode) {
  let parent = node
    .parent_id()
    .and_then(|p| p.strip_prefix(COMMENT_PREFIX))
    .map(str::to_owned);

  let slot = match parent {
    Some(id) => replies_of(forest, &id),
    None => None,
  };

  match slot {
    Some(replies) => replies.push(node),
    None => forest.push(node),
  }
}

fn replies_of<'a>(nodes: &'a mut [ForestNode], id: &str) -> Option<&'a mut Vec<ForestNode>> {
  for node in nodes.iter_mut() {
    if let ForestNode::Comment { comment, replies } = node {
      if comment.id == id {
        return Some(replies);
      }
      if let Some(found) = replies_of(replies, id) {
        return Some(found);
      }
    }
  }
  None
}

// ─── Flattening ──────────────────────────────────────────────────────────────

/// Flatten breadth-first: top-level comments, then each level of replies.
///
/// Any placeholder still present is skipped.
pub fn flatten(forest: Vec<ForestNode>) -> Vec<SourceComment> {
  let mut queue: VecDeque<ForestNode> = forest.into();
  let mut out = Vec::new();

  while let Some(node) = queue.pop_front() {
    if let ForestNode::Comment { comment, replies } = node {
      out.push(comment);
      queue.extend(replies);
    }
  }

  out
}

// ─── Mapping ─────────────────────────────────────────────────────────────────

/// Strip the comment prefix from a parent reference. Thread parents (and a
/// missing reference) yield `None`.
pub fn parent_comment_id(parent_id: Option<&str>) -> Option<String> {
  parent_id
    .and_then(|p| p.strip_prefix(COMMENT_PREFIX))
    .map(str::to_owned)
}

pub fn map_comment(comment: SourceComment, thread_id: &str) -> Result<Comment> {
  Ok(Comment {
    parent_comment_id: parent_comment_id(comment.parent_id.as_deref()),
    date_posted:       local_datetime(comment.created_utc)?,
    id:                comment.id,
    thread_id:         thread_id.to_owned(),
    username:          comment.author,
    upvotes:           comment.score,
    text:              comment.body,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{FakeSource, comment, more, source_thread};

  #[test]
  fn parent_reference_mapping() {
    assert_eq!(parent_comment_id(Some("t1_abc")), Some("abc".to_owned()));
    assert_eq!(parent_comment_id(Some("t3_xyz")), None);
    assert_eq!(parent_comment_id(None), None);
  }

  #[test]
  fn map_comment_keeps_missing_author() {
    let mut c = comment("c1", "t1_p", 100);
    c.author = None;
    let mapped = map_comment(c, "th").unwrap();
    assert_eq!(mapped.username, None);
    assert_eq!(mapped.thread_id, "th");
    assert_eq!(mapped.parent_comment_id.as_deref(), Some("p"));
  }

  #[test]
  fn flatten_is_breadth_first() {
    let forest = vec![
      ForestNode::Comment {
        comment: comment("a", "t3_th", 1),
        replies: vec![ForestNode::Comment {
          comment: comment("a1", "t1_a", 3),
          replies: vec![ForestNode::leaf(comment("a11", "t1_a1", 5))],
        }],
      },
      ForestNode::Comment {
        comment: comment("b", "t3_th", 2),
        replies: vec![ForestNode::leaf(comment("b1", "t1_b", 4))],
      },
    ];

    let ids: Vec<_> = flatten(forest).into_iter().map(|c| c.id).collect();
    assert_eq!(ids, ["a", "b", "a1", "b1", "a11"]);
  }

  #[tokio::test]
  async fn expansion_replaces_nested_placeholders() {
    let thread = source_thread("th", 1_000);
    let mut source = FakeSource::default();
    source.forests.insert(
      "th".into(),
      vec![
        ForestNode::Comment {
          comment: comment("a", "t3_th", 10),
          replies: vec![ForestNode::More(more("m1", "t1_a", &["a1", "a2"]))],
        },
        ForestNode::More(more("m0", "t3_th", &["b"])),
      ],
    );
    // The hidden replies of `a` come back flat, one of them with its own
    // placeholder further down.
    source.more.insert(
      "m1".into(),
      vec![
        ForestNode::leaf(comment("a1", "t1_a", 11)),
        ForestNode::leaf(comment("a2", "t1_a", 12)),
        ForestNode::leaf(comment("a21", "t1_a2", 13)),
        ForestNode::More(more("m2", "t1_a21", &["a211"])),
      ],
    );
    source
      .more
      .insert("m0".into(), vec![ForestNode::leaf(comment("b", "t3_th", 14))]);
    source
      .more
      .insert("m2".into(), vec![ForestNode::leaf(comment("a211", "t1_a21", 15))]);

    let comments = collect_comments(&source, &thread).await.unwrap();
    let ids: Vec<_> = comments.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "a1", "a2", "a21", "a211"]);

    let a211 = comments.iter().find(|c| c.id == "a211").unwrap();
    assert_eq!(a211.parent_comment_id.as_deref(), Some("a21"));
    let b = comments.iter().find(|c| c.id == "b").unwrap();
    assert_eq!(b.parent_comment_id, None);
  }

  #[tokio::test]
  async fn continuation_stubs_are_keyed_by_parent() {
    let thread = source_thread("th", 1_000);
    let mut source = FakeSource::default();
    source.forests.insert(
      "th".into(),
      vec![
        ForestNode::Comment {
          comment: comment("a", "t3_th", 10),
          replies: vec![ForestNode::More(more("_", "t1_a", &[]))],
        },
        ForestNode::Comment {
          comment: comment("b", "t3_th", 11),
          replies: vec![ForestNode::More(more("_", "t1_b", &[]))],
        },
      ],
    );
    source
      .more
      .insert("t1_a/continue".into(), vec![ForestNode::leaf(comment("a1", "t1_a", 12))]);
    source
      .more
      .insert("t1_b/continue".into(), vec![ForestNode::leaf(comment("b1", "t1_b", 13))]);

    let comments = collect_comments(&source, &thread).await.unwrap();
    let ids: Vec<_> = comments.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "a1", "b1"]);
  }

  #[tokio::test]
  async fn placeholder_served_twice_is_dropped() {
    let thread = source_thread("th", 1_000);
    let mut source = FakeSource::default();
    source
      .forests
      .insert("th".into(), vec![ForestNode::More(more("m", "t3_th", &["a"]))]);
    // The source keeps handing back the same placeholder.
    source.more.insert(
      "m".into(),
      vec![
        ForestNode::leaf(comment("a", "t3_th", 10)),
        ForestNode::More(more("m", "t3_th", &["a"])),
      ],
    );

    let comments = collect_comments(&source, &thread).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(source.more_requests(), 1);
  }
}
