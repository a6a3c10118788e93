//! Wire shapes of the Reddit JSON API and their conversion into the native
//! records of `skein-core`.
//!
//! Everything Reddit returns is a "thing": `{"kind": …, "data": …}`.
//! Listings wrap an array of things plus an `after` cursor.

use serde::Deserialize;
use skein_core::source::{
  ForestNode, MoreComments, SUBREDDIT_PREFIX, SourceComment, SourceSubreddit, SourceThread,
};

/// Author name Reddit reports for deleted accounts.
const DELETED: &str = "[deleted]";

// ─── Envelopes ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Thing<T> {
  pub kind: String,
  pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct Listing<T> {
  pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub struct ListingData<T> {
  pub children: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
  pub access_token: String,
  pub expires_in:   u64,
}

/// `GET /comments/{id}` returns the thread listing followed by the comment
/// listing.
pub type CommentsResponse = (serde::de::IgnoredAny, Listing<CommentThing>);

#[derive(Debug, Deserialize)]
pub struct MoreChildrenResponse {
  pub json: MoreChildrenJson,
}

#[derive(Debug, Deserialize)]
pub struct MoreChildrenJson {
  #[serde(default)]
  pub data: Option<MoreChildrenData>,
}

#[derive(Debug, Deserialize)]
pub struct MoreChildrenData {
  pub things: Vec<CommentThing>,
}

// ─── Subreddits & links ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubredditData {
  pub id:           String,
  pub display_name: String,
}

impl From<SubredditData> for SourceSubreddit {
  fn from(data: SubredditData) -> Self {
    Self { id: data.id, display_name: data.display_name }
  }
}

#[derive(Debug, Deserialize)]
pub struct LinkData {
  pub id:           String,
  pub name:         String,
  pub subreddit_id: String,
  pub title:        String,
  #[serde(default)]
  pub selftext:     String,
  pub url:          String,
  pub permalink:    String,
  pub is_self:      bool,
  pub author:       Option<String>,
  pub score:        i64,
  pub created_utc:  f64,
}

impl From<LinkData> for SourceThread {
  fn from(data: LinkData) -> Self {
    Self {
      subreddit_id: strip_prefix(data.subreddit_id, SUBREDDIT_PREFIX),
      id:           data.id,
      fullname:     data.name,
      title:        data.title,
      selftext:     data.selftext,
      url:          data.url,
      permalink:    data.permalink,
      is_self:      data.is_self,
      author:       author(data.author),
      score:        data.score,
      created_utc:  data.created_utc as i64,
    }
  }
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum CommentThing {
  #[serde(rename = "t1")]
  Comment(Box<CommentData>),
  #[serde(rename = "more")]
  More(MoreData),
}

#[derive(Debug, Deserialize)]
pub struct CommentData {
  pub id:          String,
  pub parent_id:   Option<String>,
  pub author:      Option<String>,
  #[serde(default)]
  pub score:       i64,
  pub created_utc: f64,
  #[serde(default)]
  pub body:        String,
  /// An empty string when there are no replies, a listing otherwise.
  #[serde(default)]
  pub replies:     Replies,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Replies {
  Listing(Listing<CommentThing>),
  None(serde::de::IgnoredAny),
}

impl Default for Replies {
  fn default() -> Self { Replies::None(serde::de::IgnoredAny) }
}

#[derive(Debug, Deserialize)]
pub struct MoreData {
  pub id:        String,
  pub parent_id: String,
  #[serde(default)]
  pub count:     i64,
  #[serde(default)]
  pub children:  Vec<String>,
}

impl CommentData {
  /// Split the loaded replies off the comment itself.
  fn into_parts(self) -> (SourceComment, Vec<CommentThing>) {
    let replies = match self.replies {
      Replies::Listing(listing) => listing.data.children,
      Replies::None(_) => Vec::new(),
    };
    let comment = SourceComment {
      id:          self.id,
      parent_id:   self.parent_id,
      author:      author(self.author),
      score:       self.score,
      created_utc: self.created_utc as i64,
      body:        self.body,
    };
    (comment, replies)
  }
}

impl From<CommentThing> for ForestNode {
  fn from(thing: CommentThing) -> Self {
    match thing {
      CommentThing::Comment(data) => {
        let (comment, replies) = data.into_parts();
        ForestNode::Comment {
          comment,
          replies: replies.into_iter().map(ForestNode::from).collect(),
        }
      }
      CommentThing::More(more) => ForestNode::More(MoreComments {
        id:        more.id,
        parent_id: more.parent_id,
        count:     more.count,
        children:  more.children,
      }),
    }
  }
}

/// Find the comment `id` at any depth and return its loaded replies.
pub fn replies_of(things: Vec<CommentThing>, id: &str) -> Option<Vec<ForestNode>> {
  for thing in things {
    if let CommentThing::Comment(data) = thing {
      let (comment, replies) = data.into_parts();
      if comment.id == id {
        return Some(replies.into_iter().map(ForestNode::from).collect());
      }
      if let Some(found) = replies_of(replies, id) {
        return Some(found);
      }
    }
  }
  None
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn author(raw: Option<String>) -> Option<String> { raw.filter(|a| a != DELETED) }

fn strip_prefix(id: String, prefix: &str) -> String {
  match id.strip_prefix(prefix) {
    Some(short) => short.to_owned(),
    None => id,
  }
}
