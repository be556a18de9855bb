//! SqliteStore - Persistent Storage
//!
//! TigerStyle: a single-table ordered key-value store on SQLite.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       SqliteStore                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Pool: sqlx::SqlitePool (connection pooling, WAL)            │
//! │  Table: entries (store_key BLOB PK, store_value BLOB)        │
//! │  Order: BLOB comparison is memcmp, i.e. lexicographic bytes  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS entries (
//!     store_key BLOB PRIMARY KEY NOT NULL,
//!     store_value BLOB NOT NULL
//! ) WITHOUT ROWID;
//! ```

use std::ops::Bound;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::Row;

use super::backend::{KeyValue, OrderedStore, ScanRange};
use super::error::{StorageError, StorageResult};
use crate::constants::{SQLITE_CONNECTIONS_COUNT_MAX, STORE_KEY_BYTES_MAX, STORE_VALUE_BYTES_MAX};

// =============================================================================
// SqliteStore
// =============================================================================

/// SQLite-backed [`OrderedStore`].
///
/// TigerStyle: Connection pooling, explicit schema, explicit close.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database file at `path`.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or the schema cannot be
    /// created.
    ///
    /// # Example
    /// ```ignore
    /// let store = SqliteStore::open(Path::new("/var/lib/jot/jot.db")).await?;
    /// ```
    pub async fn open(path: &Path) -> StorageResult<Self> {
        // Precondition
        assert!(
            !path.as_os_str().is_empty(),
            "database path cannot be empty"
        );

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(SQLITE_CONNECTIONS_COUNT_MAX)
            .connect_with(options)
            .await
            .map_err(|e| {
                StorageError::connection(format!("failed to open {}: {e}", path.display()))
            })?;

        tracing::debug!(path = %path.display(), "opened sqlite store");
        Self::from_pool(pool).await
    }

    /// Open a private in-memory database.
    ///
    /// The pool holds exactly one connection for its whole lifetime; an
    /// in-memory database lives only as long as its connection.
    pub async fn open_in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StorageError::connection(format!("invalid memory url: {e}")))?;

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::connection(format!("failed to open memory db: {e}")))?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating the schema if needed.
    pub async fn from_pool(pool: SqlitePool) -> StorageResult<Self> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Initialize database schema.
    async fn init_schema(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                store_key BLOB PRIMARY KEY NOT NULL,
                store_value BLOB NOT NULL
            ) WITHOUT ROWID
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::internal(format!("failed to create schema: {e}")))?;

        Ok(())
    }

    /// Get the connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// =============================================================================
// Error and Row Mapping
// =============================================================================

/// Map a sqlx error, keeping a closed pool distinguishable.
fn map_sqlx(e: sqlx::Error, wrap: fn(String) -> StorageError, context: &str) -> StorageError {
    match e {
        sqlx::Error::PoolClosed => StorageError::Closed,
        other => wrap(format!("{context}: {other}")),
    }
}

fn row_to_entry(row: &SqliteRow) -> StorageResult<KeyValue> {
    let key: Vec<u8> = row
        .try_get("store_key")
        .map_err(|e| StorageError::internal(e.to_string()))?;
    let value: Vec<u8> = row
        .try_get("store_value")
        .map_err(|e| StorageError::internal(e.to_string()))?;
    Ok((key, value))
}

/// Build the SELECT for a scan. Placeholders are bound by the caller in
/// order: lower bound, upper bound, limit.
fn scan_sql(range: &ScanRange) -> String {
    let mut sql = String::from("SELECT store_key, store_value FROM entries WHERE 1 = 1");
    match &range.start {
        Bound::Included(_) => sql.push_str(" AND store_key >= ?"),
        Bound::Excluded(_) => sql.push_str(" AND store_key > ?"),
        Bound::Unbounded => {}
    }
    match &range.end {
        Bound::Included(_) => sql.push_str(" AND store_key <= ?"),
        Bound::Excluded(_) => sql.push_str(" AND store_key < ?"),
        Bound::Unbounded => {}
    }
    if range.reverse {
        sql.push_str(" ORDER BY store_key DESC");
    } else {
        sql.push_str(" ORDER BY store_key ASC");
    }
    sql.push_str(" LIMIT ?");
    sql
}

fn bound_key(bound: &Bound<Vec<u8>>) -> Option<&Vec<u8>> {
    match bound {
        Bound::Included(key) | Bound::Excluded(key) => Some(key),
        Bound::Unbounded => None,
    }
}

// =============================================================================
// OrderedStore Implementation
// =============================================================================

#[async_trait]
impl OrderedStore for SqliteStore {
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

        sqlx::query(
            r#"
            INSERT INTO entries (store_key, store_value)
            VALUES (?, ?)
            ON CONFLICT (store_key) DO UPDATE SET store_value = excluded.store_value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx(e, StorageError::Write, "failed to put"))?;

        Ok(())
    }

    async fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let row = sqlx::query("SELECT store_value FROM entries WHERE store_key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx(e, StorageError::Read, "failed to get"))?;

        match row {
            Some(row) => {
                let value: Vec<u8> = row
                    .try_get("store_value")
                    .map_err(|e| StorageError::internal(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &[u8]) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM entries WHERE store_key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx(e, StorageError::Write, "failed to delete"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn scan(&self, range: &ScanRange) -> StorageResult<Vec<KeyValue>> {
        if range.is_inverted() {
            return Ok(Vec::new());
        }

        let limit = range.effective_limit();
        let sql = scan_sql(range);
        let mut query = sqlx::query(&sql);
        if let Some(start) = bound_key(&range.start) {
            query = query.bind(start.clone());
        }
        if let Some(end) = bound_key(&range.end) {
            query = query.bind(end.clone());
        }
        let limit_param = i64::try_from(limit).unwrap_or(i64::MAX);
        query = query.bind(limit_param);

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx(e, StorageError::Read, "failed to scan"))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            entries.push(row_to_entry(row)?);
        }

        // Postcondition
        assert!(
            entries.len() <= limit,
            "result count {} exceeds limit {}",
            entries.len(),
            limit
        );

        Ok(entries)
    }

    async fn close(&self) -> StorageResult<()> {
        self.pool.close().await;
        tracing::debug!("closed sqlite store");
        Ok(())
    }
}
