//! Reply-tree reconstruction.
//!
//! Comments are read back flat, oldest first. [`CommentTree::build`] places
//! each one under its parent in an arena, using a per-call index from comment
//! id to node. The index key `None` is the sentinel root.

use std::collections::HashMap;

use tracing::warn;

use crate::model::Comment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct TreeNode {
  /// `None` only for the root.
  pub comment:  Option<Comment>,
  /// Set when the comment's parent had not been placed yet and it was
  /// attached to the root instead.
  pub orphaned: bool,
  pub children: Vec<NodeId>,
}

/// An arena of comment nodes hanging off a sentinel root.
#[derive(Debug, Clone)]
pub struct CommentTree {
  nodes: Vec<TreeNode>,
}

impl CommentTree {
  pub const ROOT: NodeId = NodeId(0);

  /// Build the tree from comments in non-decreasing `date_posted` order.
  ///
  /// A comment whose parent has not been placed on an earlier step is
  /// attached to the root and flagged as orphaned.
  pub fn build(comments: impl IntoIterator<Item = Comment>) -> Self {
    let mut tree = Self {
      nodes: vec![TreeNode { comment: None, orphaned: false, children: Vec::new() }],
    };
    let mut index: HashMap<Option<String>, NodeId> = HashMap::new();
    index.insert(None, Self::ROOT);

    for comment in comments {
      let (parent, orphaned) = match index.get(&comment.parent_comment_id) {
        Some(&parent) => (parent, false),
        None => {
          warn!(
            comment = %comment.id,
            parent = ?comment.parent_comment_id,
            "parent comment not placed yet; attaching to root"
          );
          (Self::ROOT, true)
        }
      };

      let id = NodeId(tree.nodes.len());
      let key = Some(comment.id.clone());
      tree.nodes.push(TreeNode { comment: Some(comment), orphaned, children: Vec::new() });
      tree.nodes[parent.0].children.push(id);
      index.insert(key, id);
    }

    tree
  }

  pub fn node(&self, id: NodeId) -> &TreeNode { &self.nodes[id.0] }

  pub fn children(&self, id: NodeId) -> &[NodeId] { &self.nodes[id.0].children }

  /// Number of comments in the tree (the root is not counted).
  pub fn len(&self) -> usize { self.nodes.len() - 1 }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}
