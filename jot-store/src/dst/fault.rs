//! Fault Injection
//!
//! TigerStyle: faults are data. Each [`FaultConfig`] names an operation
//! kind, a probability, and optionally a key prefix and a budget, so a test
//! can fail exactly the second write of a dual write and nothing else.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use super::rng::DeterministicRng;
use crate::constants::DST_FAULT_PROBABILITY_MAX;

/// Which store operation a fault applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultType {
    /// `put` returns a write error
    StorageWriteFail,
    /// `delete` returns a write error
    StorageDeleteFail,
    /// `get` returns a read error
    StorageReadFail,
    /// `scan` returns a read error
    StorageScanFail,
}

impl FaultType {
    /// Short name for logs and error messages.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StorageWriteFail => "storage_write_fail",
            Self::StorageDeleteFail => "storage_delete_fail",
            Self::StorageReadFail => "storage_read_fail",
            Self::StorageScanFail => "storage_scan_fail",
        }
    }
}

impl std::fmt::Display for FaultType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One injectable fault.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultConfig {
    /// Operation the fault applies to
    pub fault_type: FaultType,
    /// Chance of firing per matching operation
    pub probability: f64,
    /// Only keys starting with this prefix are affected
    pub key_prefix: Option<Vec<u8>>,
    /// Stop firing after this many injections
    pub count_max: Option<u64>,
}

impl FaultConfig {
    /// Fault firing with `probability` on every matching operation.
    ///
    /// # Panics
    /// Panics if probability is outside `[0, DST_FAULT_PROBABILITY_MAX]`.
    #[must_use]
    pub fn new(fault_type: FaultType, probability: f64) -> Self {
        assert!(
            (0.0..=DST_FAULT_PROBABILITY_MAX).contains(&probability),
            "fault probability {} outside [0, {}]",
            probability,
            DST_FAULT_PROBABILITY_MAX
        );
        Self {
            fault_type,
            probability,
            key_prefix: None,
            count_max: None,
        }
    }

    /// Fault that fires on every matching operation.
    #[must_use]
    pub fn always(fault_type: FaultType) -> Self {
        Self::new(fault_type, DST_FAULT_PROBABILITY_MAX)
    }

    /// Restrict the fault to keys with this prefix.
    #[must_use]
    pub fn with_key_prefix(mut self, prefix: impl Into<Vec<u8>>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Fire at most `count` times.
    #[must_use]
    pub fn with_count_max(mut self, count: u64) -> Self {
        self.count_max = Some(count);
        self
    }

    fn matches(&self, fault_type: FaultType, key: &[u8]) -> bool {
        self.fault_type == fault_type
            && self
                .key_prefix
                .as_deref()
                .map_or(true, |prefix| key.starts_with(prefix))
    }
}

// =============================================================================
// FaultInjector
// =============================================================================

/// Decides, deterministically, whether an operation fails.
#[derive(Debug)]
pub struct FaultInjector {
    faults: Vec<FaultConfig>,
    fired: Vec<AtomicU64>,
    rng: Mutex<DeterministicRng>,
}

impl FaultInjector {
    /// Injector with no faults.
    #[must_use]
    pub fn none() -> Self {
        FaultInjectorBuilder::new(DeterministicRng::new(0)).build()
    }

    /// Start building an injector driven by `rng`.
    #[must_use]
    pub fn builder(rng: DeterministicRng) -> FaultInjectorBuilder {
        FaultInjectorBuilder::new(rng)
    }

    /// Whether an operation of `fault_type` on `key` should fail now.
    ///
    /// Returns the fault that fired, if any.
    pub fn should_fail(&self, fault_type: FaultType, key: &[u8]) -> Option<FaultType> {
        for (index, fault) in self.faults.iter().enumerate() {
            if !fault.matches(fault_type, key) {
                continue;
            }
            let fired = &self.fired[index];
            if let Some(count_max) = fault.count_max {
                if fired.load(Ordering::SeqCst) >= count_max {
                    continue;
                }
            }
            let roll = {
                let mut rng = match self.rng.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                rng.next_bool(fault.probability)
            };
            if roll {
                fired.fetch_add(1, Ordering::SeqCst);
                tracing::debug!(fault = %fault.fault_type, "injected fault");
                return Some(fault.fault_type);
            }
        }
        None
    }

    /// Total faults injected so far.
    #[must_use]
    pub fn injected_count(&self) -> u64 {
        self.fired.iter().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    /// Number of configured faults.
    #[must_use]
    pub fn len(&self) -> usize {
        self.faults.len()
    }

    /// True when no faults are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faults.is_empty()
    }
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::none()
    }
}

/// Builder for [`FaultInjector`].
#[derive(Debug)]
pub struct FaultInjectorBuilder {
    rng: DeterministicRng,
    faults: Vec<FaultConfig>,
}

impl FaultInjectorBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new(rng: DeterministicRng) -> Self {
        Self {
            rng,
            faults: Vec::new(),
        }
    }

    /// Add a fault.
    #[must_use]
    pub fn with_fault(mut self, fault: FaultConfig) -> Self {
        self.faults.push(fault);
        self
    }

    /// Build the injector.
    #[must_use]
    pub fn build(self) -> FaultInjector {
        let fired = self.faults.iter().map(|_| AtomicU64::new(0)).collect();
        FaultInjector {
            faults: self.faults,
            fired,
            rng: Mutex::new(self.rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn injector(fault: FaultConfig) -> FaultInjector {
        FaultInjector::builder(DeterministicRng::new(42))
            .with_fault(fault)
            .build()
    }

    #[test]
    fn test_no_faults() {
        let faults = FaultInjector::none();
        assert!(faults.is_empty());
        assert_eq!(faults.should_fail(FaultType::StorageWriteFail, b"k"), None);
    }

    #[test]
    fn test_always_fires_on_matching_type_only() {
        let faults = injector(FaultConfig::always(FaultType::StorageWriteFail));
        assert_eq!(
            faults.should_fail(FaultType::StorageWriteFail, b"k"),
            Some(FaultType::StorageWriteFail)
        );
        assert_eq!(faults.should_fail(FaultType::StorageReadFail, b"k"), None);
        assert_eq!(faults.injected_count(), 1);
    }

    #[test]
    fn test_key_prefix() {
        let faults = injector(
            FaultConfig::always(FaultType::StorageWriteFail).with_key_prefix(b"post!".to_vec()),
        );
        assert!(faults.should_fail(FaultType::StorageWriteFail, b"user!u1!1").is_none());
        assert!(faults.should_fail(FaultType::StorageWriteFail, b"post!1").is_some());
    }

    #[test]
    fn test_count_max() {
        let faults = injector(FaultConfig::always(FaultType::StorageDeleteFail).with_count_max(2));
        assert!(faults.should_fail(FaultType::StorageDeleteFail, b"k").is_some());
        assert!(faults.should_fail(FaultType::StorageDeleteFail, b"k").is_some());
        assert!(faults.should_fail(FaultType::StorageDeleteFail, b"k").is_none());
        assert_eq!(faults.injected_count(), 2);
    }

    #[test]
    fn test_zero_probability_never_fires() {
        let faults = injector(FaultConfig::new(FaultType::StorageScanFail, 0.0));
        for _ in 0..100 {
            assert!(faults.should_fail(FaultType::StorageScanFail, b"").is_none());
        }
    }

    #[test]
    #[should_panic(expected = "fault probability")]
    fn test_probability_out_of_range() {
        let _ = FaultConfig::new(FaultType::StorageWriteFail, 1.5);
    }
}
