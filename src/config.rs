//! Configuration
//!
//! TigerStyle: defaults, then the JSON file, then CLI flags. Later wins.

use std::path::{Path, PathBuf};

use jot_store::SQLITE_FILE_NAME;
use serde::{Deserialize, Serialize};

use crate::posts::{FEED_LIMIT_DEFAULT, FEED_LIMIT_MAX};

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Config file read when none is named
pub const CONFIG_FILE_DEFAULT: &str = "local.json";

/// Data directory when none is configured
pub const DATA_DIR_DEFAULT: &str = "~/.jot";

/// Maximum config file size in bytes
pub const CONFIG_FILE_BYTES_MAX: u64 = 64 * 1024;

// =============================================================================
// Config
// =============================================================================

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Directory holding the database; `~` is expanded
    pub data_dir: String,
    /// Feed length used when a command gives none
    pub feed_limit: usize,
    /// `EnvFilter` directive used when neither `RUST_LOG` nor `-v` is set
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: DATA_DIR_DEFAULT.to_string(),
            feed_limit: FEED_LIMIT_DEFAULT,
            log_filter: None,
        }
    }
}

impl Config {
    /// Load from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    /// [`ConfigError`] if the file cannot be read, is too large, fails to
    /// parse, or holds invalid values.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::io(path, e)),
        };
        if metadata.len() > CONFIG_FILE_BYTES_MAX {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                len: metadata.len(),
                max: CONFIG_FILE_BYTES_MAX,
            });
        }

        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::io(path, e))?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Check value bounds.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.trim().is_empty() {
            return Err(ConfigError::Invalid("dataDir cannot be empty".to_string()));
        }
        if self.feed_limit == 0 || self.feed_limit > FEED_LIMIT_MAX {
            return Err(ConfigError::Invalid(format!(
                "feedLimit must be 1..={FEED_LIMIT_MAX}, got {}",
                self.feed_limit
            )));
        }
        Ok(())
    }

    /// `data_dir` with `~` expanded.
    #[must_use]
    pub fn data_dir_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir).into_owned())
    }

    /// SQLite file inside the data directory.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.data_dir_path().join(SQLITE_FILE_NAME)
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {} too large: {len} > {max} bytes", path.display())]
    TooLarge { path: PathBuf, len: u64, max: u64 },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();

        let config = Config::load(&dir.path().join("absent.json")).await.unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.feed_limit, FEED_LIMIT_DEFAULT);
    }

    #[tokio::test]
    async fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_DEFAULT);
        tokio::fs::write(&path, r#"{"feedLimit": 25}"#).await.unwrap();

        let config = Config::load(&path).await.unwrap();

        assert_eq!(config.feed_limit, 25);
        assert_eq!(config.data_dir, DATA_DIR_DEFAULT);
    }

    #[tokio::test]
    async fn test_bad_json_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_DEFAULT);
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let err = Config::load(&path).await.unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_out_of_range_limit_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_DEFAULT);
        tokio::fs::write(&path, r#"{"feedLimit": 0}"#).await.unwrap();

        let err = Config::load(&path).await.unwrap_err();

        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_database_path() {
        let config = Config {
            data_dir: "/var/lib/jot".to_string(),
            ..Config::default()
        };

        assert_eq!(
            config.database_path(),
            PathBuf::from("/var/lib/jot").join(SQLITE_FILE_NAME)
        );
    }
}
