//! SimStore - in-memory ordered store with fault injection
//!
//! TigerStyle: the test double is a real ordered map, not a mock. Faults
//! come from an injected [`FaultInjector`] so failures are reproducible.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::backend::{KeyValue, OrderedStore, ScanRange};
use super::error::{StorageError, StorageResult};
use crate::constants::{STORE_KEY_BYTES_MAX, STORE_VALUE_BYTES_MAX};
use crate::dst::{FaultInjector, FaultType};

/// In-memory [`OrderedStore`] backed by a `BTreeMap`.
#[derive(Debug)]
pub struct SimStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    faults: Arc<FaultInjector>,
    closed: AtomicBool,
}

impl SimStore {
    /// Empty store without faults.
    #[must_use]
    pub fn new() -> Self {
        Self::with_faults(Arc::new(FaultInjector::none()))
    }

    /// Empty store consulting `faults` before every operation.
    #[must_use]
    pub fn with_faults(faults: Arc<FaultInjector>) -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            faults,
            closed: AtomicBool::new(false),
        }
    }

    /// The injector this store consults.
    #[must_use]
    pub fn faults(&self) -> &Arc<FaultInjector> {
        &self.faults
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    /// True when nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }

    /// All keys in ascending order.
    pub async fn keys(&self) -> Vec<Vec<u8>> {
        self.data.read().await.keys().cloned().collect()
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StorageError::Closed);
        }
        Ok(())
    }

    fn inject(&self, fault_type: FaultType, key: &[u8]) -> StorageResult<()> {
        match self.faults.should_fail(fault_type, key) {
            None => Ok(()),
            Some(fault) => {
                let message = format!("injected {fault} on {}", String::from_utf8_lossy(key));
                match fault {
                    FaultType::StorageWriteFail | FaultType::StorageDeleteFail => {
                        Err(StorageError::write(message))
                    }
                    FaultType::StorageReadFail | FaultType::StorageScanFail => {
                        Err(StorageError::read(message))
                    }
                }
            }
        }
    }
}

impl Default for SimStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderedStore for SimStore {
    async fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        // Preconditions
        assert!(!key.is_empty(), "key cannot be empty");
        assert!(
            key.len() <= STORE_KEY_BYTES_MAX,
            "key {} bytes exceeds max {}",
            key.len(),
            STORE_KEY_BYTES_MAX
        );
        assert!(
            value.len() <= STORE_VALUE_BYTES_MAX,
            "value {} bytes exceeds max {}",
            value.len(),
            STORE_VALUE_BYTES_MAX
        );

        self.ensure_open()?;
        self.inject(FaultType::StorageWriteFail, key)?;

        self.data.write().await.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    async fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.ensure_open()?;
        self.inject(FaultType::StorageReadFail, key)?;

        Ok(self.data.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &[u8]) -> StorageResult<bool> {
        self.ensure_open()?;
        self.inject(FaultType::StorageDeleteFail, key)?;

        Ok(self.data.write().await.remove(key).is_some())
    }

    async fn scan(&self, range: &ScanRange) -> StorageResult<Vec<KeyValue>> {
        self.ensure_open()?;
        let probe: &[u8] = match &range.start {
            std::ops::Bound::Included(key) | std::ops::Bound::Excluded(key) => key,
            std::ops::Bound::Unbounded => &[],
        };
        self.inject(FaultType::StorageScanFail, probe)?;

        if range.is_inverted() {
            return Ok(Vec::new());
        }

        let limit = range.effective_limit();
        let data = self.data.read().await;
        let entries = data.range::<Vec<u8>, _>((range.start.clone(), range.end.clone()));
        let result: Vec<KeyValue> = if range.reverse {
            entries
                .rev()
                .take(limit)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        } else {
            entries
                .take(limit)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        };

        // Postcondition
        assert!(
            result.len() <= limit,
            "result count {} exceeds limit {}",
            result.len(),
            limit
        );

        Ok(result)
    }

    async fn close(&self) -> StorageResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dst::{DeterministicRng, FaultConfig};

    async fn seeded(keys: &[&str]) -> SimStore {
        let store = SimStore::new();
        for key in keys {
            store.put(key.as_bytes(), key.as_bytes()).await.unwrap();
        }
        store
    }

    fn keys_of(entries: &[KeyValue]) -> Vec<String> {
        entries
            .iter()
            .map(|(k, _)| String::from_utf8(k.clone()).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = SimStore::new();

        store.put(b"a", b"1").await.unwrap();
        assert_eq!(store.get(b"a").await.unwrap(), Some(b"1".to_vec()));

        store.put(b"a", b"2").await.unwrap();
        assert_eq!(store.get(b"a").await.unwrap(), Some(b"2".to_vec()));

        assert!(store.delete(b"a").await.unwrap());
        assert!(!store.delete(b"a").await.unwrap());
        assert_eq!(store.get(b"a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_scan_orders_and_limits() {
        let store = seeded(&["p!1", "p!2", "p!3", "q!1"]).await;

        let forward = store
            .scan(&ScanRange::all().gte(b"p!".to_vec()).lt(b"p!\xff".to_vec()))
            .await
            .unwrap();
        assert_eq!(keys_of(&forward), vec!["p!1", "p!2", "p!3"]);

        let backward = store
            .scan(
                &ScanRange::all()
                    .gte(b"p!".to_vec())
                    .lt(b"p!\xff".to_vec())
                    .limit(2)
                    .reverse(),
            )
            .await
            .unwrap();
        assert_eq!(keys_of(&backward), vec!["p!3", "p!2"]);
    }

    #[tokio::test]
    async fn test_scan_inverted_range_is_empty() {
        let store = seeded(&["a", "b"]).await;
        let entries = store
            .scan(&ScanRange::all().gt(b"b".to_vec()).lt(b"b".to_vec()))
            .await
            .unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_closed_store_rejects_operations() {
        let store = seeded(&["a"]).await;
        store.close().await.unwrap();

        assert_eq!(store.get(b"a").await, Err(StorageError::Closed));
        assert_eq!(store.put(b"b", b"").await, Err(StorageError::Closed));
        assert_eq!(store.scan(&ScanRange::all()).await, Err(StorageError::Closed));
    }

    #[tokio::test]
    async fn test_injected_write_fault_leaves_store_untouched() {
        let faults = FaultInjector::builder(DeterministicRng::new(1))
            .with_fault(FaultConfig::always(FaultType::StorageWriteFail).with_key_prefix(b"x".to_vec()))
            .build();
        let store = SimStore::with_faults(Arc::new(faults));

        let err = store.put(b"x1", b"v").await.unwrap_err();
        assert!(err.is_write());
        store.put(b"y1", b"v").await.unwrap();

        assert_eq!(store.keys().await, vec![b"y1".to_vec()]);
        assert_eq!(store.faults().injected_count(), 1);
    }

    #[tokio::test]
    async fn test_injected_read_fault() {
        let faults = FaultInjector::builder(DeterministicRng::new(1))
            .with_fault(FaultConfig::always(FaultType::StorageScanFail))
            .build();
        let store = SimStore::with_faults(Arc::new(faults));

        let err = store.scan(&ScanRange::all()).await.unwrap_err();
        assert!(matches!(err, StorageError::Read(_)));
    }
}
