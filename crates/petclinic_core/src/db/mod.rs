//! SQLite storage bootstrap and schema migrations.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No pet data is read or written before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Storage failure, split by the stage that produced it.
#[derive(Debug)]
pub enum DbError {
    /// SQLite could not open the file or memory database.
    Open(rusqlite::Error),
    /// Connection pragmas or reading the schema version failed.
    Bootstrap(rusqlite::Error),
    /// One migration script failed; nothing from the batch is committed.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer binary.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Statement failure on an open, migrated connection.
    Sqlite(rusqlite::Error),
}

impl DbError {
    /// Stable label written into `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Open(_) => "db_open_failed",
            Self::Bootstrap(_) => "db_bootstrap_failed",
            Self::Migration { .. } => "db_migration_failed",
            Self::UnsupportedSchemaVersion { .. } => "db_schema_too_new",
            Self::Sqlite(_) => "db_query_failed",
        }
    }
}

// Messages name the stage only; the SQLite detail is reachable via `source()`.
impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(_) => write!(f, "cannot open database"),
            Self::Bootstrap(_) => write!(f, "cannot configure database connection"),
            Self::Migration { version, .. } => write!(f, "schema migration {version} failed"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Sqlite(_) => write!(f, "sqlite error"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open(err) | Self::Bootstrap(err) | Self::Sqlite(err) => Some(err),
            Self::Migration { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
