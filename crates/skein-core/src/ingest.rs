//! The ingestion pipeline: a cutoff-bounded sweep of a subreddit's "new"
//! listing into a [`ThreadStore`], committed as a single unit of work.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  forest::collect_comments,
  model::{Subreddit, Thread, local_datetime},
  source::{SourceThread, ThreadSource},
  store::ThreadStore,
};

/// Listing page size requested from the source.
pub const BATCH_SIZE: usize = 100;

/// Prepended to a thread's relative permalink to form its canonical URL.
pub const PERMALINK_BASE: &str = "https://reddit.com";

// ─── Report ──────────────────────────────────────────────────────────────────

/// Why the sweep ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
  /// A thread older than the cutoff was reached.
  Cutoff,
  /// The source returned an empty page.
  Exhausted,
  /// A page held only threads already seen, so the cursor could not move.
  Stalled,
}

/// Summary of a completed (committed) ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
  pub subreddit_id: String,
  pub threads:      usize,
  pub comments:     usize,
  pub stopped:      StopReason,
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Drives a [`ThreadSource`] into a [`ThreadStore`].
pub struct Ingestor<S> {
  source: S,
}

impl<S: ThreadSource> Ingestor<S> {
  pub fn new(source: S) -> Self { Self { source } }

  pub fn source(&self) -> &S { &self.source }

  /// Ingest every thread of `subreddit` posted at or after `cutoff`.
  ///
  /// All writes happen inside one transaction on `store`. It is committed
  /// once the sweep ends and rolled back if any fetch or write fails, in
  /// which case the original error is returned.
  pub async fn ingest<T: ThreadStore>(
    &self,
    subreddit: &str,
    cutoff: NaiveDateTime,
    store: &T,
  ) -> Result<IngestReport> {
    store.begin().await.map_err(Error::from_store)?;

    let outcome = match self.sweep(subreddit, cutoff, store).await {
      Ok(report) => store
        .commit()
        .await
        .map(|()| report)
        .map_err(Error::from_store),
      Err(err) => Err(err),
    };

    // A failed commit (e.g. a deferred constraint) leaves the transaction
    // open, so it is rolled back as well.
    let report = match outcome {
      Ok(report) => report,
      Err(err) => {
        if let Err(rollback_err) = store.rollback().await {
          warn!(error = %rollback_err, "rollback after failed ingestion also failed");
        }
        return Err(err);
      }
    };

    info!(
      subreddit,
      threads = report.threads,
      comments = report.comments,
      stopped = ?report.stopped,
      "data ingested"
    );
    Ok(report)
  }

  async fn sweep<T: ThreadStore>(
    &self,
    name: &str,
    cutoff: NaiveDateTime,
    store: &T,
  ) -> Result<IngestReport> {
    // The subreddit row must exist before any thread references it.
    let native = self
      .source
      .subreddit(name)
      .await
      .map_err(Error::from_source)?;
    let subreddit = Subreddit { id: native.id, name: native.display_name };
    store
      .upsert_subreddit(&subreddit)
      .await
      .map_err(Error::from_store)?;

    let mut report = IngestReport {
      subreddit_id: subreddit.id,
      threads:      0,
      comments:     0,
      stopped:      StopReason::Exhausted,
    };
    let mut seen: HashSet<String> = HashSet::new();
    let mut after: Option<String> = None;

    loop {
      debug!(subreddit = name, after = ?after, "fetching listing page");
      let batch = self
        .source
        .new_threads(name, after.as_deref(), BATCH_SIZE)
        .await
        .map_err(Error::from_source)?;

      if batch.is_empty() {
        report.stopped = StopReason::Exhausted;
        return Ok(report);
      }

      let cursor = after.clone();

      for item in batch {
        info!(title = %item.title, "processing thread");

        if local_datetime(item.created_utc)? < cutoff {
          report.stopped = StopReason::Cutoff;
          return Ok(report);
        }

        if !seen.insert(item.id.clone()) {
          warn!(thread = %item.id, "thread already ingested in this run; skipping");
          continue;
        }

        let mut thread = map_thread(&item)?;
        thread.comments = collect_comments(&self.source, &item).await?;

        store.upsert_thread(&thread).await.map_err(Error::from_store)?;
        store
          .upsert_comments(&thread.comments)
          .await
          .map_err(Error::from_store)?;

        report.threads += 1;
        report.comments += thread.comments.len();
        after = Some(item.fullname);
      }

      if after == cursor {
        warn!(subreddit = name, "listing page held no new threads; stopping");
        report.stopped = StopReason::Stalled;
        return Ok(report);
      }
    }
  }
}

/// Map a listing item into a [`Thread`] with no comments attached.
pub fn map_thread(item: &SourceThread) -> Result<Thread> {
  Ok(Thread {
    id:           item.id.clone(),
    subreddit_id: item.subreddit_id.clone(),
    title:        item.title.clone(),
    text:         Some(item.selftext.clone()),
    external_url: (!item.is_self).then(|| item.url.clone()),
    url:          format!("{PERMALINK_BASE}{}", item.permalink),
    username:     item.author.clone(),
    upvotes:      item.score,
    date_posted:  local_datetime(item.created_utc)?,
    comments:     Vec::new(),
  })
}
