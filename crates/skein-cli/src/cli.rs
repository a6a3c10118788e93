//! Command-line arguments.

use std::path::PathBuf;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::{ArgGroup, Parser};

#[derive(Parser, Debug)]
#[command(
  name = "skein",
  version,
  about = "Ingest a subreddit's recent threads and print their comment trees"
)]
#[command(group(
  ArgGroup::new("target")
    .required(true)
    .args(["subreddit", "subreddit_url"]),
))]
pub struct Args {
  /// Earliest posting date to ingest and display (YYYY-MM-DD, not in the
  /// future).
  #[arg(
    long,
    alias = "lookback_date",
    value_name = "YYYY-MM-DD",
    value_parser = parse_lookback_date
  )]
  pub lookback_date: NaiveDate,

  /// Subreddit name, e.g. `rust`.
  #[arg(long, value_name = "NAME")]
  pub subreddit: Option<String>,

  /// Subreddit URL, e.g. `https://www.reddit.com/r/rust/`. Holds the name
  /// taken from the URL once parsed.
  #[arg(
    long,
    alias = "subreddit_url",
    value_name = "URL",
    value_parser = subreddit_from_url
  )]
  pub subreddit_url: Option<String>,

  /// Path to a TOML settings file.
  #[arg(short, long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Only print what is already stored; do not contact Reddit.
  #[arg(long)]
  pub skip_ingest: bool,
}

impl Args {
  /// The selected subreddit name, from whichever selector was given.
  pub fn subreddit_name(&self) -> &str {
    self
      .subreddit
      .as_deref()
      .or(self.subreddit_url.as_deref())
      .unwrap_or_default()
  }

  /// Local midnight at the start of the lookback date.
  pub fn cutoff(&self) -> NaiveDateTime { self.lookback_date.and_time(NaiveTime::MIN) }
}

fn parse_lookback_date(raw: &str) -> Result<NaiveDate, String> {
  let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .map_err(|e| format!("expected YYYY-MM-DD: {e}"))?;
  not_in_future(date, Local::now().date_naive())
}

fn not_in_future(date: NaiveDate, today: NaiveDate) -> Result<NaiveDate, String> {
  if date > today {
    return Err(format!("{date} is in the future"));
  }
  Ok(date)
}

/// The second-to-last `/` segment of `url`, after adding a trailing `/` if
/// it is missing.
pub fn subreddit_from_url(url: &str) -> Result<String, String> {
  let mut url = url.trim().to_owned();
  if !url.ends_with('/') {
    url.push('/');
  }
  match url.split('/').rev().nth(1) {
    Some(name) if !name.is_empty() => Ok(name.to_owned()),
    _ => Err(format!("no subreddit name in {url:?}")),
  }
}

#[cfg(test)]
mod tests {
  use clap::{CommandFactory, error::ErrorKind};

  use super::*;

  fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
    Args::try_parse_from(std::iter::once("skein").chain(argv.iter().copied()))
  }

  #[test]
  fn command_definition_is_valid() { Args::command().debug_assert(); }

  #[test]
  fn name_from_url_with_or_without_trailing_slash() {
    assert_eq!(subreddit_from_url("https://www.reddit.com/r/rust/").unwrap(), "rust");
    assert_eq!(subreddit_from_url("https://www.reddit.com/r/rust").unwrap(), "rust");
    assert_eq!(subreddit_from_url("rust").unwrap(), "rust");
    assert!(subreddit_from_url("/").is_err());
    assert!(subreddit_from_url("https://www.reddit.com/r//").is_err());
  }

  #[test]
  fn future_dates_are_rejected() {
    let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
    assert!(not_in_future(today, today).is_ok());
    assert!(not_in_future(today.pred_opt().unwrap(), today).is_ok());
    assert!(not_in_future(today.succ_opt().unwrap(), today).is_err());
  }

  #[test]
  fn accepts_name_selector() {
    let args = parse(&["--lookback-date", "2024-05-01", "--subreddit", "rust"]).unwrap();
    assert_eq!(args.subreddit_name(), "rust");
    assert!(!args.skip_ingest);
    assert_eq!(
      args.cutoff(),
      NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
    );
  }

  #[test]
  fn accepts_underscore_aliases() {
    let args = parse(&[
      "--lookback_date",
      "2024-05-01",
      "--subreddit_url",
      "https://www.reddit.com/r/learnrust/",
    ])
    .unwrap();
    assert_eq!(args.subreddit_name(), "learnrust");
  }

  #[test]
  fn selectors_are_mutually_exclusive() {
    let err = parse(&[
      "--lookback-date",
      "2024-05-01",
      "--subreddit",
      "rust",
      "--subreddit-url",
      "https://www.reddit.com/r/rust/",
    ])
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
  }

  #[test]
  fn a_selector_is_required() {
    let err = parse(&["--lookback-date", "2024-05-01"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
  }

  #[test]
  fn malformed_date_is_a_usage_error() {
    let err = parse(&["--lookback-date", "05/01/2024", "--subreddit", "rust"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueValidation);
  }

  #[test]
  fn empty_url_name_is_a_usage_error() {
    let err = parse(&["--lookback-date", "2024-05-01", "--subreddit-url", "/"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueValidation);
  }
}
