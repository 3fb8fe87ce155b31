//! Database schema migrations for SQLite.
//!
//! Each migration is a SQL batch that transforms the schema from version N
//! to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// Idempotent: it can be called on every open.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
        tracing::info!(from = current, to = CURRENT_VERSION, "schema migrated");
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Latest state of each component
        CREATE TABLE snapshots (
            component TEXT PRIMARY KEY,       -- e.g. 'ledger', 'registry'
            height INTEGER NOT NULL,          -- transaction height reflected
            state BLOB NOT NULL,              -- CBOR-encoded component state
            saved_at INTEGER NOT NULL         -- chain time of the save (Unix s)
        );

        -- Committed transactions
        CREATE TABLE journal (
            height INTEGER PRIMARY KEY,
            entry_point TEXT NOT NULL,
            caller BLOB NOT NULL,             -- 32 bytes
            value TEXT NOT NULL,              -- u128 as decimal text
            at INTEGER NOT NULL               -- chain time (Unix s)
        );

        CREATE INDEX idx_journal_caller ON journal(caller);
        CREATE INDEX idx_journal_entry_point ON journal(entry_point);
        "#,
    )?;

    Ok(())
}

/// Wall-clock time in milliseconds, zero if the clock is before the epoch.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
