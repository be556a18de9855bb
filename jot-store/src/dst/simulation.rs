//! Simulation - one seeded world per test
//!
//! TigerStyle: a simulation owns the clock, the RNG and the fault plan.
//! The closure under test receives a [`SimEnvironment`] and nothing else.

use std::future::Future;
use std::sync::Arc;

use super::clock::SimClock;
use super::config::SimConfig;
use super::fault::{FaultConfig, FaultInjector, FaultType};
use super::rng::DeterministicRng;
use crate::storage::SimStore;

/// Builder and runner for a deterministic simulation.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    faults: Vec<FaultConfig>,
}

/// Everything a simulated test may touch.
#[derive(Debug)]
pub struct SimEnvironment {
    /// Run configuration (seed, start time)
    pub config: SimConfig,
    /// Fault-injecting store
    pub store: Arc<SimStore>,
    /// Shared simulated clock
    pub clock: SimClock,
    /// RNG for test-side decisions, independent of the fault RNG
    pub rng: DeterministicRng,
}

impl Simulation {
    /// Create a simulation from a config.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            faults: Vec::new(),
        }
    }

    /// Add a fault.
    #[must_use]
    pub fn with_fault(mut self, fault: FaultConfig) -> Self {
        self.faults.push(fault);
        self
    }

    /// Add write, delete, read and scan faults, each at `probability`.
    #[must_use]
    pub fn with_storage_faults(self, probability: f64) -> Self {
        self.with_fault(FaultConfig::new(FaultType::StorageWriteFail, probability))
            .with_fault(FaultConfig::new(FaultType::StorageDeleteFail, probability))
            .with_fault(FaultConfig::new(FaultType::StorageReadFail, probability))
            .with_fault(FaultConfig::new(FaultType::StorageScanFail, probability))
    }

    /// Materialize the environment without running anything.
    #[must_use]
    pub fn build(&self) -> SimEnvironment {
        let mut root = DeterministicRng::new(self.config.seed);
        let fault_rng = root.fork();
        let test_rng = root.fork();

        let faults = self
            .faults
            .iter()
            .cloned()
            .fold(FaultInjector::builder(fault_rng), |builder, fault| {
                builder.with_fault(fault)
            })
            .build();

        SimEnvironment {
            config: self.config,
            store: Arc::new(SimStore::with_faults(Arc::new(faults))),
            clock: SimClock::at_ms(self.config.start_ms),
            rng: test_rng,
        }
    }

    /// Run `test` inside a fresh environment.
    ///
    /// # Errors
    /// Whatever the test returns, with the seed attached for replay.
    pub async fn run<F, Fut, T>(self, test: F) -> anyhow::Result<T>
    where
        F: FnOnce(SimEnvironment) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let seed = self.config.seed;
        tracing::debug!(seed, faults = self.faults.len(), "starting simulation");
        let env = self.build();
        test(env)
            .await
            .map_err(|e| e.context(format!("simulation failed (seed={seed})")))
    }
}

/// Simulation with `seed`, or a seed from `DST_SEED`/random when `None`.
#[must_use]
pub fn create_simulation(seed: Option<u64>) -> Simulation {
    let config = match seed {
        Some(seed) => SimConfig::with_seed(seed),
        None => SimConfig::from_env_or_random(),
    };
    Simulation::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::OrderedStore;

    #[tokio::test]
    async fn test_simulation_runs_closure() {
        let sim = Simulation::new(SimConfig::with_seed(42).starting_at_ms(10_000));

        let secs = sim
            .run(|env| async move {
                env.store.put(b"key", b"value").await?;
                env.clock.advance_ms(1000);
                let value = env.store.get(b"key").await?;
                assert_eq!(value, Some(b"value".to_vec()));
                Ok::<_, anyhow::Error>(env.clock.now_secs())
            })
            .await
            .unwrap();

        assert_eq!(secs, 11);
    }

    #[tokio::test]
    async fn test_same_seed_same_faults() {
        let outcomes = |seed| async move {
            let env = Simulation::new(SimConfig::with_seed(seed))
                .with_storage_faults(0.5)
                .build();
            let mut results = Vec::new();
            for i in 0u8..32 {
                results.push(env.store.put(&[b'k', i], b"v").await.is_ok());
            }
            results
        };

        assert_eq!(outcomes(7).await, outcomes(7).await);
    }

    #[tokio::test]
    async fn test_failure_carries_seed() {
        let err = create_simulation(Some(99))
            .run(|_env| async move { Err::<(), _>(anyhow::anyhow!("boom")) })
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("seed=99"));
    }
}
