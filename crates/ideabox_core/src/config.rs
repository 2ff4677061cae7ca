//! Environment-driven runtime configuration.
//!
//! # Responsibility
//! - Resolve log level, log directory and database path for hosts.
//! - Start file logging from the resolved settings.
//!
//! # Invariants
//! - Blank variables behave as if unset.
//! - Resolution never fails; invalid values surface later in the
//!   component that consumes them (e.g. `init_logging`).

use crate::logging::{default_log_level, init_logging};
use std::path::PathBuf;

pub const ENV_LOG_LEVEL: &str = "IDEABOX_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "IDEABOX_LOG_DIR";
pub const ENV_DB_PATH: &str = "IDEABOX_DB_PATH";

const DEFAULT_DB_FILE_NAME: &str = "ideabox.sqlite3";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub log_level: String,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub db_path: PathBuf,
}

impl CoreConfig {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, e.g. a map in tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            log_level: read(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
            db_path: read(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
        }
    }

    /// Starts file logging when `log_dir` is set.
    ///
    /// Returns `Ok(false)` without touching the logger when no directory is
    /// configured.
    ///
    /// # Errors
    /// - Everything `init_logging` rejects.
    /// - `log_dir` is not valid UTF-8.
    pub fn init_logging(&self) -> Result<bool, String> {
        let Some(log_dir) = self.log_dir.as_ref() else {
            return Ok(false);
        };
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| format!("log_dir is not valid UTF-8: `{}`", log_dir.display()))?;
        init_logging(&self.log_level, log_dir)?;
        Ok(true)
    }
}
