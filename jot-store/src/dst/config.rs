//! SimConfig - Simulation Parameters

use crate::constants::DST_SEED_ENV_VAR;

/// Configuration for one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Seed for every RNG in the run
    pub seed: u64,
    /// Simulated wall-clock start, milliseconds since epoch
    pub start_ms: u64,
}

impl SimConfig {
    /// Config with an explicit seed, clock at zero.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self { seed, start_ms: 0 }
    }

    /// Seed from `DST_SEED` if set and parseable, otherwise random.
    ///
    /// The chosen seed is logged so a failing run can be replayed.
    #[must_use]
    pub fn from_env_or_random() -> Self {
        let seed = std::env::var(DST_SEED_ENV_VAR)
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or_else(rand::random::<u64>);
        tracing::info!(seed, "DST seed (replay with {}={})", DST_SEED_ENV_VAR, seed);
        Self::with_seed(seed)
    }

    /// Start the simulated clock at `start_ms`.
    #[must_use]
    pub fn starting_at_ms(mut self, start_ms: u64) -> Self {
        self.start_ms = start_ms;
        self
    }
}
