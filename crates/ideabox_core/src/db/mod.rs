//! Idea database: connection bootstrap and schema versioning.
//!
//! # Responsibility
//! - Hand out SQLite connections whose `notes` and `projects` tables are
//!   ready for `SqliteIdeaStore`.
//! - Refuse files written by a newer build instead of guessing at their
//!   layout.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - Archive and trash flags are stored as `0|1` integers and constrained
//!   by the schema.
//!
//! # See also
//! - `crate::store::sqlite` for the queries running on these tables.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating the idea database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// File carries a schema this build does not know.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Stable label for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::UnsupportedSchemaVersion { .. } => "unsupported_schema",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "idea database error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "idea database uses schema v{db_version}; this build reads up to v{latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
