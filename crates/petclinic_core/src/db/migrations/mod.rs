//! Versioned `pets` schema scripts and the runner that applies them.
//!
//! # Invariants
//! - `version` values are strictly increasing.
//! - After a successful run `PRAGMA user_version` equals `latest_version()`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Returns the newest schema version this binary knows.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings `conn` to `latest_version()` in a single transaction.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is ahead of this binary.
/// - `Migration` naming the first script that failed.
/// - `Bootstrap` when reading the version or transaction control fails.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current = conn
        .pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))
        .map_err(DbError::Bootstrap)?;
    let latest = latest_version();

    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }
    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction().map_err(DbError::Bootstrap)?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        tx.execute_batch(migration.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", migration.version))
            .map_err(|source| DbError::Migration {
                version: migration.version,
                source,
            })?;
    }
    tx.commit().map_err(DbError::Bootstrap)?;

    info!("event=db_migrate module=db status=ok from_version={current} to_version={latest}");
    Ok(())
}
