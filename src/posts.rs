//! Post Store
//!
//! TigerStyle: every post is written twice, once per feed.
//!
//! ```text
//! create ──► user!<uid>!<ts>  ──ok──► post!<ts>
//! delete ──► post!<ts>        ──ok──► user!<requesting uid>!<ts>
//! ```
//!
//! The two writes are not atomic. A failure between them leaves a per-user
//! copy behind. It is logged and never rolled back.

use std::sync::Arc;

use jot_store::{Clock, KeyValue, OrderedStore, StorageError};
use serde::{Deserialize, Serialize};

use crate::keys::{self, KeyError};
use crate::render::DisplayPost;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Feed length when the caller does not choose one
pub const FEED_LIMIT_DEFAULT: usize = 10;

/// Longest feed a single call may request
pub const FEED_LIMIT_MAX: usize = 100;

/// Maximum stored content length in bytes
pub const POST_CONTENT_BYTES_MAX: usize = 64 * 1024;

/// Maximum author display name length in bytes
pub const AUTHOR_NAME_BYTES_MAX: usize = 256;

// =============================================================================
// Types
// =============================================================================

/// One post, as stored under both of its keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Author uid, as supplied by the caller
    pub uid: String,
    /// Author display name at write time
    #[serde(rename = "name", alias = "authorName")]
    pub author_name: String,
    /// Unix seconds, assigned by the store
    #[serde(rename = "created")]
    pub created_at: u64,
    /// Storage-ready content; never interpreted here
    pub content: String,
}

/// A post together with the physical key it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Physical key (`post!<ts>` or `user!<uid>!<ts>`)
    pub key: String,
    /// Decoded record
    pub post: Post,
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Requesting and claimed uid differ; nothing was touched.
    Unauthorized,
    /// The global copy is gone.
    Deleted {
        /// Timestamp taken from the key
        created_at: u64,
        /// False when removing the per-user copy failed
        user_copy_removed: bool,
    },
}

// =============================================================================
// Errors
// =============================================================================

/// Post store errors
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("store write failed: {0}")]
    StoreWrite(#[source] StorageError),

    #[error("store read failed: {0}")]
    StoreRead(#[source] StorageError),

    #[error("post not found: {0}")]
    NotFound(String),

    #[error("invalid uid: {0}")]
    InvalidUid(#[source] KeyError),

    #[error("invalid key: {0}")]
    InvalidKey(#[source] KeyError),

    #[error("author name cannot be empty")]
    EmptyAuthorName,

    #[error("author name too long: {len} > {max}")]
    AuthorNameTooLong { len: usize, max: usize },

    #[error("content too long: {len} > {max}")]
    ContentTooLong { len: usize, max: usize },

    #[error("invalid feed limit: {limit} (must be 1..={max})")]
    InvalidLimit { limit: usize, max: usize },

    #[error("record encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("corrupt record at {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PostError {
    /// HTTP-style status for callers that speak HTTP.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Encoding(_) | Self::Corrupt { .. } => 500,
            Self::StoreWrite(_)
            | Self::StoreRead(_)
            | Self::InvalidUid(_)
            | Self::InvalidKey(_)
            | Self::EmptyAuthorName
            | Self::AuthorNameTooLong { .. }
            | Self::ContentTooLong { .. }
            | Self::InvalidLimit { .. } => 400,
        }
    }

    /// True for [`PostError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for post operations
pub type PostResult<T> = Result<T, PostError>;

// =============================================================================
// PostStore
// =============================================================================

/// Both feeds over one ordered store.
#[derive(Clone)]
pub struct PostStore {
    store: Arc<dyn OrderedStore>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for PostStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostStore")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl PostStore {
    /// Create a post store over `store`, stamping posts from `clock`.
    #[must_use]
    pub fn new(store: Arc<dyn OrderedStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn OrderedStore> {
        &self.store
    }

    /// Write a post to the user's feed, then to the global feed.
    ///
    /// Two posts in the same second share a global key; the later one wins.
    ///
    /// # Errors
    /// - Validation errors before anything is written
    /// - [`PostError::StoreWrite`] if either write fails; when the global
    ///   write fails the per-user copy stays behind
    pub async fn create(&self, uid: &str, author_name: &str, content: &str) -> PostResult<Post> {
        keys::validate_uid(uid).map_err(PostError::InvalidUid)?;
        if author_name.is_empty() {
            return Err(PostError::EmptyAuthorName);
        }
        if author_name.len() > AUTHOR_NAME_BYTES_MAX {
            return Err(PostError::AuthorNameTooLong {
                len: author_name.len(),
                max: AUTHOR_NAME_BYTES_MAX,
            });
        }
        if content.len() > POST_CONTENT_BYTES_MAX {
            return Err(PostError::ContentTooLong {
                len: content.len(),
                max: POST_CONTENT_BYTES_MAX,
            });
        }

        let post = Post {
            uid: uid.to_string(),
            author_name: author_name.to_string(),
            created_at: self.clock.now_secs(),
            content: content.to_string(),
        };
        let value = serde_json::to_vec(&post)?;
        let user_key = keys::user_key(uid, post.created_at).map_err(PostError::InvalidUid)?;
        let global_key = keys::global_key(post.created_at);

        self.store
            .put(user_key.as_bytes(), &value)
            .await
            .map_err(PostError::StoreWrite)?;

        if let Err(e) = self.store.put(global_key.as_bytes(), &value).await {
            tracing::warn!(
                uid,
                user_key = %user_key,
                global_key = %global_key,
                error = %e,
                "global write failed; per-user copy left behind"
            );
            return Err(PostError::StoreWrite(e));
        }

        tracing::debug!(uid, created_at = post.created_at, "created post");
        Ok(post)
    }

    /// Newest posts across all users, at most `limit`.
    ///
    /// # Errors
    /// [`PostError::InvalidLimit`], [`PostError::StoreRead`], or
    /// [`PostError::Corrupt`] for an undecodable record.
    pub async fn list_global_recent(&self, limit: usize) -> PostResult<Vec<FeedEntry>> {
        check_limit(limit)?;
        self.scan_feed(keys::global_range(limit)).await
    }

    /// Newest posts by `uid`, at most `limit`.
    ///
    /// # Errors
    /// As [`PostStore::list_global_recent`], plus [`PostError::InvalidUid`].
    pub async fn list_user_recent(&self, uid: &str, limit: usize) -> PostResult<Vec<FeedEntry>> {
        check_limit(limit)?;
        let range = keys::user_range(uid, limit).map_err(PostError::InvalidUid)?;
        self.scan_feed(range).await
    }

    /// The default-length feed of `uid`, ready to display.
    ///
    /// # Errors
    /// As [`PostStore::list_user_recent`].
    pub async fn recent_for_user(&self, uid: &str) -> PostResult<Vec<DisplayPost>> {
        let entries = self.list_user_recent(uid, FEED_LIMIT_DEFAULT).await?;
        Ok(entries.into_iter().map(DisplayPost::from).collect())
    }

    /// The post stored under `key`, a key from an earlier listing.
    ///
    /// # Errors
    /// [`PostError::NotFound`] if absent, [`PostError::StoreRead`] on
    /// store failure.
    pub async fn get_by_key(&self, key: &str) -> PostResult<FeedEntry> {
        let value = self
            .store
            .get(key.as_bytes())
            .await
            .map_err(PostError::StoreRead)?
            .ok_or_else(|| PostError::NotFound(key.to_string()))?;

        Ok(FeedEntry {
            key: key.to_string(),
            post: decode(key, &value)?,
        })
    }

    /// Delete the post at `key` on behalf of `requesting_uid`.
    ///
    /// The per-user key is derived from `requesting_uid`, not from the
    /// stored record. Its removal is best effort: a failure is logged and
    /// reported as `user_copy_removed: false`.
    ///
    /// # Errors
    /// - [`PostError::InvalidKey`] if `key` has no decimal timestamp
    /// - [`PostError::InvalidUid`] if `requesting_uid` is not a valid uid
    /// - [`PostError::NotFound`] if the global copy is absent
    /// - [`PostError::StoreWrite`] if deleting the global copy fails
    pub async fn delete(
        &self,
        requesting_uid: &str,
        claimed_uid: &str,
        key: &str,
    ) -> PostResult<DeleteOutcome> {
        if requesting_uid != claimed_uid {
            tracing::debug!(requesting_uid, claimed_uid, key, "delete refused");
            return Ok(DeleteOutcome::Unauthorized);
        }

        let created_at = keys::timestamp_of(key).map_err(PostError::InvalidKey)?;
        let global_key = keys::global_key(created_at);
        let user_key =
            keys::user_key(requesting_uid, created_at).map_err(PostError::InvalidUid)?;

        let existed = self
            .store
            .delete(global_key.as_bytes())
            .await
            .map_err(PostError::StoreWrite)?;
        if !existed {
            return Err(PostError::NotFound(global_key));
        }

        let user_copy_removed = match self.store.delete(user_key.as_bytes()).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    uid = requesting_uid,
                    user_key = %user_key,
                    error = %e,
                    "per-user delete failed; copy left behind"
                );
                false
            }
        };

        tracing::debug!(uid = requesting_uid, created_at, user_copy_removed, "deleted post");
        Ok(DeleteOutcome::Deleted {
            created_at,
            user_copy_removed,
        })
    }

    /// Close the underlying store.
    ///
    /// # Errors
    /// [`PostError::StoreWrite`] if the store fails to close cleanly.
    pub async fn close(&self) -> PostResult<()> {
        self.store.close().await.map_err(PostError::StoreWrite)
    }

    async fn scan_feed(&self, range: jot_store::ScanRange) -> PostResult<Vec<FeedEntry>> {
        let limit = range.effective_limit();
        let rows = self.store.scan(&range).await.map_err(PostError::StoreRead)?;

        // Postcondition
        assert!(rows.len() <= limit, "scan returned more than limit");

        rows.into_iter().map(decode_row).collect()
    }
}

fn check_limit(limit: usize) -> PostResult<()> {
    if limit == 0 || limit > FEED_LIMIT_MAX {
        return Err(PostError::InvalidLimit {
            limit,
            max: FEED_LIMIT_MAX,
        });
    }
    Ok(())
}

fn decode(key: &str, value: &[u8]) -> PostResult<Post> {
    serde_json::from_slice(value).map_err(|source| PostError::Corrupt {
        key: key.to_string(),
        source,
    })
}

fn decode_row((key, value): KeyValue) -> PostResult<FeedEntry> {
    let key = String::from_utf8_lossy(&key).into_owned();
    let post = decode(&key, &value)?;
    Ok(FeedEntry { key, post })
}

// =============================================================================
// Tests
// =============================================================================
