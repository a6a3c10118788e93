//! Async HTTP client for the Reddit OAuth API.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::de::DeserializeOwned;
use skein_core::source::{
  COMMENT_PREFIX, ForestNode, MoreComments, SourceSubreddit, SourceThread, ThreadSource,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
  Error, Result,
  wire::{
    CommentsResponse, LinkData, Listing, MoreChildrenResponse, SubredditData, Thing,
    TokenResponse, replies_of,
  },
};

/// Most ids `/api/morechildren` accepts per request.
const MORE_CHILDREN_CHUNK: usize = 100;

/// A token this close to expiry is refreshed before use.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Connection settings for the Reddit API.
#[derive(Debug, Clone)]
pub struct RedditConfig {
  pub client_id:     String,
  pub client_secret: String,
  pub user_agent:    String,
  /// Base of the authenticated API, normally `https://oauth.reddit.com`.
  pub api_url:       String,
  /// Base of the token endpoint, normally `https://www.reddit.com`.
  pub auth_url:      String,
}

struct Token {
  value:      String,
  expires_at: Instant,
}

/// Read-only Reddit client authenticated with app-only credentials.
pub struct RedditClient {
  client: Client,
  config: RedditConfig,
  token:  Mutex<Option<Token>>,
}

impl RedditClient {
  pub fn new(config: RedditConfig) -> Result<Self> {
    let client = Client::builder()
      .user_agent(config.user_agent.clone())
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config, token: Mutex::new(None) })
  }

  fn api(&self, path: &str) -> String {
    format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
  }

  /// A valid bearer token, fetching a new one when none is cached or the
  /// cached one is about to expire.
  async fn access_token(&self) -> Result<String> {
    let mut cached = self.token.lock().await;
    let fresh = cached
      .as_ref()
      .filter(|token| Instant::now() + TOKEN_REFRESH_MARGIN < token.expires_at);
    if let Some(token) = fresh {
      return Ok(token.value.clone());
    }

    let url = format!("{}/api/v1/access_token", self.config.auth_url.trim_end_matches('/'));
    debug!(%url, "requesting access token");
    let resp = self
      .client
      .post(&url)
      .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
      .form(&[("grant_type", "client_credentials")])
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(Error::Auth(resp.status()));
    }
    let body: TokenResponse = resp.json().await?;
    let value = body.access_token;
    *cached = Some(Token {
      value:      value.clone(),
      expires_at: Instant::now() + Duration::from_secs(body.expires_in),
    });
    Ok(value)
  }

  async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
    let token = self.access_token().await?;
    debug!(path, ?query, "GET");
    let resp = self
      .client
      .get(self.api(path))
      .bearer_auth(token)
      .query(query)
      .query(&[("raw_json", "1")])
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(Error::Status { endpoint: path.to_owned(), status: resp.status() });
    }
    Ok(resp.json().await?)
  }

  // ── Endpoints ─────────────────────────────────────────────────────────────

  /// `GET /api/morechildren`, one request per chunk of hidden ids.
  async fn load_more(&self, thread: &SourceThread, more: &MoreComments) -> Result<Vec<ForestNode>> {
    let mut nodes = Vec::new();
    for chunk in more.children.chunks(MORE_CHILDREN_CHUNK) {
      let children = chunk.join(",");
      let resp: MoreChildrenResponse = self
        .get("/api/morechildren", &[
          ("api_type", "json"),
          ("link_id", thread.fullname.as_str()),
          ("children", children.as_str()),
        ])
        .await?;
      let things = resp.json.data.map(|d| d.things).unwrap_or_default();
      nodes.extend(things.into_iter().map(ForestNode::from));
    }
    Ok(nodes)
  }

  /// Re-fetch the thread focused on the stub's parent and return the
  /// parent's replies.
  async fn load_continuation(
    &self,
    thread: &SourceThread,
    more: &MoreComments,
  ) -> Result<Vec<ForestNode>> {
    let parent = more
      .parent_id
      .strip_prefix(COMMENT_PREFIX)
      .unwrap_or(&more.parent_id);
    let path = format!("/comments/{}", thread.id);
    let (_, listing): CommentsResponse = self.get(&path, &[("comment", parent)]).await?;

    match replies_of(listing.data.children, parent) {
      Some(replies) => Ok(replies),
      None => {
        warn!(thread = %thread.id, parent, "continuation parent missing from response");
        Ok(Vec::new())
      }
    }
  }
}

// ─── ThreadSource impl ───────────────────────────────────────────────────────

impl ThreadSource for RedditClient {
  type Error = Error;

  async fn subreddit(&self, name: &str) -> Result<SourceSubreddit> {
    let about: Thing<SubredditData> = self.get(&format!("/r/{name}/about"), &[]).await?;
    if about.kind != "t5" {
      return Err(Error::SubredditNotFound(name.to_owned()));
    }
    Ok(about.data.into())
  }

  async fn new_threads(
    &self,
    name: &str,
    after: Option<&str>,
    limit: usize,
  ) -> Result<Vec<SourceThread>> {
    let limit = limit.to_string();
    let mut query = vec![("limit", limit.as_str())];
    if let Some(after) = after {
      query.push(("after", after));
    }

    let listing: Listing<Thing<LinkData>> =
      self.get(&format!("/r/{name}/new"), &query).await?;
    Ok(
      listing
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == "t3")
        .map(|thing| thing.data.into())
        .collect(),
    )
  }

  async fn comment_forest(&self, thread: &SourceThread) -> Result<Vec<ForestNode>> {
    let path = format!("/comments/{}", thread.id);
    let (_, listing): CommentsResponse = self
      .get(&path, &[("limit", "500"), ("sort", "old")])
      .await?;
    Ok(listing.data.children.into_iter().map(ForestNode::from).collect())
  }

  async fn more_children(
    &self,
    thread: &SourceThread,
    more: &MoreComments,
  ) -> Result<Vec<ForestNode>> {
    if more.is_continuation() {
      self.load_continuation(thread, more).await
    } else {
      self.load_more(thread, more).await
    }
  }
}
