//! Core types and algorithms for skein.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! remote listing, the relational store and the terminal are reached through
//! the [`source::ThreadSource`], [`store::ThreadStore`] and
//! [`display::DisplaySink`] traits; the ingestion sweep, comment-forest
//! expansion and reply-tree reconstruction live here.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod display;
pub mod error;
pub mod forest;
pub mod ingest;
pub mod model;
pub mod render;
pub mod source;
pub mod store;
pub mod tree;

pub use error::{Error, Result};

#[cfg(test)]
mod testing;
