//! Jot - post feeds over an ordered key-value store
//!
//! TigerStyle: two feeds, one flat key space, no secondary indexes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  jot CLI                                    │
//! ├─────────────────────────────────────────────┤
//! │  PostStore   │ create, feeds, get, delete   │
//! │  keys        │ post!<ts>, user!<uid>!<ts>   │
//! │  render      │ escape, autolink, dates      │
//! ├─────────────────────────────────────────────┤
//! │  jot-store   │ OrderedStore (sim / sqlite)  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use jot::{render, PostStore};
//! use jot_store::{SimClock, SimStore};
//!
//! # tokio_test::block_on(async {
//! let posts = PostStore::new(Arc::new(SimStore::new()), Arc::new(SimClock::at_secs(1000)));
//!
//! posts.create("u1", "Alice", &render::prepare_content("hi")).await?;
//! let feed = posts.list_global_recent(10).await?;
//!
//! assert_eq!(feed[0].key, "post!00000000000000001000");
//! assert_eq!(feed[0].post.author_name, "Alice");
//! # Ok::<_, jot::PostError>(())
//! # }).unwrap();
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod keys;
pub mod posts;
pub mod render;

pub use config::{Config, ConfigError};
pub use keys::KeyError;
pub use posts::{
    DeleteOutcome, FeedEntry, Post, PostError, PostResult, PostStore, FEED_LIMIT_DEFAULT,
    FEED_LIMIT_MAX,
};
pub use render::DisplayPost;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Application name
pub const APP_NAME: &str = "jot";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
