//! TigerStyle Constants
//!
//! Every limit carries its unit in the name, big-endian style:
//! `STORE_KEY_BYTES_MAX`, not `MAX_KEY_SIZE`.

// =============================================================================
// Time
// =============================================================================

/// Milliseconds per second
pub const TIME_MS_PER_SEC: u64 = 1_000;

/// Largest single simulated clock advance (one year)
pub const DST_TIME_ADVANCE_MS_MAX: u64 = 365 * 24 * 60 * 60 * TIME_MS_PER_SEC;

// =============================================================================
// Store Limits
// =============================================================================

/// Maximum key length in bytes
pub const STORE_KEY_BYTES_MAX: usize = 1_024;

/// Maximum value length in bytes
pub const STORE_VALUE_BYTES_MAX: usize = 1_024 * 1_024;

/// Maximum entries a single scan may return
pub const SCAN_LIMIT_MAX: usize = 10_000;

// =============================================================================
// SQLite
// =============================================================================

/// Database file name inside the data directory
pub const SQLITE_FILE_NAME: &str = "jot.db";

/// Maximum pooled connections for a file-backed store
pub const SQLITE_CONNECTIONS_COUNT_MAX: u32 = 4;

// =============================================================================
// DST
// =============================================================================

/// Environment variable holding an explicit simulation seed
pub const DST_SEED_ENV_VAR: &str = "DST_SEED";

/// Maximum configured fault probability
pub const DST_FAULT_PROBABILITY_MAX: f64 = 1.0;
