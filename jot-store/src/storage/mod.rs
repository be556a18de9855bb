//! Storage - Ordered Key-Value Trait and Implementations
//!
//! TigerStyle: Abstract storage with simulation-first testing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    OrderedStore Trait                        │
//! │   put / get / delete / scan(gte|gt, lte|lt, limit, reverse)  │
//! └─────────────────────────────────────────────────────────────┘
//!          ↑                              ↑
//!          │                              │
//! ┌────────┴────────┐           ┌────────┴────────┐
//! │    SimStore     │           │   SqliteStore   │
//! │   (testing)     │           │  (production)   │
//! └─────────────────┘           └─────────────────┘
//! ```

mod backend;
mod error;
mod sim;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use backend::{KeyValue, OrderedStore, ScanRange};
pub use error::{StorageError, StorageResult};
pub use sim::SimStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
