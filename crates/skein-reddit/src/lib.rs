//! Reddit backend for skein.
//!
//! [`RedditClient`] implements [`skein_core::source::ThreadSource`] over the
//! Reddit OAuth JSON API using app-only (client credentials) authentication.

mod client;
mod wire;

pub mod error;

pub use client::{RedditClient, RedditConfig};
pub use error::{Error, Result};
