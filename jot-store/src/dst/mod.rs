//! DST - Deterministic Simulation Testing
//!
//! TigerBeetle/FoundationDB-style deterministic simulation testing framework.
//!
//! # Philosophy
//!
//! > "If you're not testing with fault injection, you're not testing."
//!
//! # Usage
//!
//! ```rust
//! use jot_store::dst::{FaultConfig, FaultType, SimConfig, Simulation};
//! use jot_store::OrderedStore;
//!
//! # tokio_test::block_on(async {
//! let sim = Simulation::new(SimConfig::with_seed(42))
//!     .with_fault(FaultConfig::always(FaultType::StorageWriteFail).with_key_prefix(b"post!".to_vec()));
//!
//! sim.run(|env| async move {
//!     env.store.put(b"user!u1!1", b"value").await?;
//!     assert!(env.store.put(b"post!1", b"value").await.is_err());
//!     env.clock.advance_ms(1000);
//!     Ok::<_, anyhow::Error>(())
//! })
//! .await
//! .unwrap();
//! # });
//! ```
//!
//! Run with explicit seed for reproducibility:
//! ```bash
//! DST_SEED=12345 cargo test
//! ```

mod clock;
mod config;
mod fault;
mod rng;
mod simulation;

pub use clock::SimClock;
pub use config::SimConfig;
pub use fault::{FaultConfig, FaultInjector, FaultInjectorBuilder, FaultType};
pub use rng::DeterministicRng;
pub use simulation::{create_simulation, SimEnvironment, Simulation};
