//! Jot Store - Ordered Key-Value Storage with DST
//!
//! TigerStyle simulation-first storage boundary.
//!
//! # Philosophy
//!
//! Built simulation-first:
//! 1. All I/O goes through the injectable [`OrderedStore`] trait
//! 2. Time goes through the injectable [`Clock`] trait
//! 3. Every failure path is reachable with a seeded [`dst::FaultInjector`]
//! 4. Seeds are logged for reproducibility
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               Jot Store                      │
//! ├─────────────────────────────────────────────┤
//! │  OrderedStore trait     │ flat byte keys    │
//! │  SimStore               │ BTreeMap + faults │
//! │  SqliteStore            │ WITHOUT ROWID blob│
//! ├─────────────────────────────────────────────┤
//! │  DST Framework          │ Fault injection   │
//! └─────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod constants;
pub mod dst;
pub mod storage;

// Re-export common types
pub use clock::{Clock, SystemClock};
pub use constants::*;
pub use dst::{
    create_simulation, DeterministicRng, FaultConfig, FaultInjector, FaultType, SimClock,
    SimConfig, SimEnvironment, Simulation,
};
pub use storage::{KeyValue, OrderedStore, ScanRange, SimStore, StorageError, StorageResult};

#[cfg(feature = "sqlite")]
pub use storage::SqliteStore;
