//! OrderedStore - the backend trait
//!
//! TigerStyle: one flat namespace of byte-string keys, compared
//! lexicographically. Point operations plus ordered range scans.

use std::ops::Bound;

use async_trait::async_trait;

use super::error::StorageResult;
use crate::constants::SCAN_LIMIT_MAX;

/// A key and its value, as returned by [`OrderedStore::scan`].
pub type KeyValue = (Vec<u8>, Vec<u8>);

// =============================================================================
// ScanRange
// =============================================================================

/// Bounds, direction and cap for a range scan.
///
/// Built fluently, mirroring the usual read-stream options:
///
/// ```
/// use jot_store::ScanRange;
///
/// let range = ScanRange::all().gte(b"post!".to_vec()).lt(b"post!\xff".to_vec()).limit(10).reverse();
/// assert!(range.contains(b"post!42"));
/// assert!(!range.contains(b"user!42"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRange {
    /// Lower bound
    pub start: Bound<Vec<u8>>,
    /// Upper bound
    pub end: Bound<Vec<u8>>,
    /// Maximum number of entries returned
    pub limit: Option<usize>,
    /// Descending key order when set
    pub reverse: bool,
}

impl ScanRange {
    /// Unbounded, ascending, uncapped.
    #[must_use]
    pub fn all() -> Self {
        Self {
            start: Bound::Unbounded,
            end: Bound::Unbounded,
            limit: None,
            reverse: false,
        }
    }

    /// Keys greater than or equal to `key`.
    #[must_use]
    pub fn gte(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.start = Bound::Included(key.into());
        self
    }

    /// Keys strictly greater than `key`.
    #[must_use]
    pub fn gt(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.start = Bound::Excluded(key.into());
        self
    }

    /// Keys less than or equal to `key`.
    #[must_use]
    pub fn lte(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.end = Bound::Included(key.into());
        self
    }

    /// Keys strictly less than `key`.
    #[must_use]
    pub fn lt(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.end = Bound::Excluded(key.into());
        self
    }

    /// Cap the number of returned entries.
    ///
    /// # Panics
    /// Panics if `limit` is zero or exceeds `SCAN_LIMIT_MAX`.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        assert!(limit > 0, "limit must be positive");
        assert!(
            limit <= SCAN_LIMIT_MAX,
            "limit {} exceeds max {}",
            limit,
            SCAN_LIMIT_MAX
        );
        self.limit = Some(limit);
        self
    }

    /// Return entries in descending key order.
    #[must_use]
    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// Whether `key` falls inside the bounds (ignores limit).
    #[must_use]
    pub fn contains(&self, key: &[u8]) -> bool {
        let above_start = match &self.start {
            Bound::Included(start) => key >= start.as_slice(),
            Bound::Excluded(start) => key > start.as_slice(),
            Bound::Unbounded => true,
        };
        let below_end = match &self.end {
            Bound::Included(end) => key <= end.as_slice(),
            Bound::Excluded(end) => key < end.as_slice(),
            Bound::Unbounded => true,
        };
        above_start && below_end
    }

    /// True when no key can satisfy both bounds.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        match (&self.start, &self.end) {
            (Bound::Included(start), Bound::Included(end)) => start > end,
            (Bound::Included(start), Bound::Excluded(end))
            | (Bound::Excluded(start), Bound::Included(end))
            | (Bound::Excluded(start), Bound::Excluded(end)) => start >= end,
            _ => false,
        }
    }

    /// Effective cap, `SCAN_LIMIT_MAX` when none was set.
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(SCAN_LIMIT_MAX)
    }
}

impl Default for ScanRange {
    fn default() -> Self {
        Self::all()
    }
}

// =============================================================================
// OrderedStore
// =============================================================================

/// An ordered byte-string key-value store.
///
/// Each single-key write is atomic with respect to readers of that key.
/// Nothing is atomic across keys.
#[async_trait]
pub trait OrderedStore: Send + Sync {
    /// Insert or overwrite `key`.
    async fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Fetch the value under `key`, `None` if absent.
    async fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Remove `key`. Returns whether it existed.
    async fn delete(&self, key: &[u8]) -> StorageResult<bool>;

    /// Entries inside `range`, ascending (descending if `range.reverse`),
    /// at most `range.limit` of them.
    async fn scan(&self, range: &ScanRange) -> StorageResult<Vec<KeyValue>>;

    /// Release the backend. Later calls fail with `StorageError::Closed`.
    async fn close(&self) -> StorageResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_half_open() {
        let range = ScanRange::all().gte(b"a".to_vec()).lt(b"c".to_vec());
        assert!(range.contains(b"a"));
        assert!(range.contains(b"b\xff"));
        assert!(!range.contains(b"c"));
        assert!(!range.contains(b"0"));
    }

    #[test]
    fn test_contains_inclusive_end() {
        let range = ScanRange::all().gt(b"a".to_vec()).lte(b"c".to_vec());
        assert!(!range.contains(b"a"));
        assert!(range.contains(b"c"));
    }

    #[test]
    fn test_is_inverted() {
        assert!(ScanRange::all().gte(b"b".to_vec()).lt(b"a".to_vec()).is_inverted());
        assert!(ScanRange::all().gte(b"a".to_vec()).lt(b"a".to_vec()).is_inverted());
        assert!(!ScanRange::all().gte(b"a".to_vec()).lte(b"a".to_vec()).is_inverted());
        assert!(!ScanRange::all().is_inverted());
    }

    #[test]
    fn test_effective_limit() {
        assert_eq!(ScanRange::all().effective_limit(), SCAN_LIMIT_MAX);
        assert_eq!(ScanRange::all().limit(3).effective_limit(), 3);
    }

    #[test]
    #[should_panic(expected = "limit must be positive")]
    fn test_zero_limit() {
        let _ = ScanRange::all().limit(0);
    }
}
