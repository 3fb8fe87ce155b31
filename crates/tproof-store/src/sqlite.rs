//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use tproof_core::{Principal, Timestamp};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{InsertResult, JournalEntry, Snapshot, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|e| {
                StoreError::Database(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
                    Some(format!("mutex poisoned: {}", e)),
                ))
            })?;
            f(&conn)
        })
        .await?
    }
}

fn row_to_snapshot(row: &rusqlite::Row<'_>) -> rusqlite::Result<Snapshot> {
    let state: Vec<u8> = row.get("state")?;
    Ok(Snapshot {
        component: row.get("component")?,
        height: row.get("height")?,
        bytes: Bytes::from(state),
        saved_at: row.get("saved_at")?,
    })
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<JournalEntry> {
    let caller: Vec<u8> = row.get("caller")?;
    let caller: [u8; 32] = caller.try_into().map_err(|_| {
        rusqlite::Error::InvalidColumnType(2, "caller".into(), rusqlite::types::Type::Blob)
    })?;
    let value: String = row.get("value")?;
    let value = value.parse().map_err(|_| {
        rusqlite::Error::InvalidColumnType(3, "value".into(), rusqlite::types::Type::Text)
    })?;

    Ok(JournalEntry {
        height: row.get("height")?,
        entry_point: row.get("entry_point")?,
        caller: Principal::from_bytes(caller),
        value,
        at: row.get("at")?,
    })
}

fn get_entry(conn: &Connection, height: u64) -> Result<Option<JournalEntry>> {
    Ok(conn
        .query_row(
            "SELECT height, entry_point, caller, value, at FROM journal WHERE height = ?1",
            params![height],
            row_to_entry,
        )
        .optional()?)
}

#[async_trait]
impl Store for SqliteStore {
    async fn put_snapshot(
        &self,
        component: &str,
        height: u64,
        bytes: &[u8],
        saved_at: Timestamp,
    ) -> Result<()> {
        let component = component.to_owned();
        let bytes = bytes.to_vec();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO snapshots (component, height, state, saved_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(component) DO UPDATE SET
                    height = excluded.height,
                    state = excluded.state,
                    saved_at = excluded.saved_at",
                params![component, height, bytes, saved_at],
            )?;
            debug!(component = %component, height, size = bytes.len(), "snapshot saved");
            Ok(())
        })
        .await
    }

    async fn get_snapshot(&self, component: &str) -> Result<Option<Snapshot>> {
        let component = component.to_owned();

        self.with_conn(move |conn| {
            Ok(conn
                .query_row(
                    "SELECT component, height, state, saved_at FROM snapshots WHERE component = ?1",
                    params![component],
                    row_to_snapshot,
                )
                .optional()?)
        })
        .await
    }

    async fn list_snapshots(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT component FROM snapshots ORDER BY component")?;
            let names = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(names)
        })
        .await
    }

    async fn append_journal(&self, entry: &JournalEntry) -> Result<InsertResult> {
        let entry = entry.clone();

        self.with_conn(move |conn| {
            if let Some(existing) = get_entry(conn, entry.height)? {
                return Ok(if existing == entry {
                    InsertResult::AlreadyExists
                } else {
                    InsertResult::Conflict { existing }
                });
            }

            conn.execute(
                "INSERT INTO journal (height, entry_point, caller, value, at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    entry.height,
                    entry.entry_point,
                    entry.caller.as_bytes().as_slice(),
                    entry.value.to_string(),
                    entry.at,
                ],
            )?;
            Ok(InsertResult::Inserted)
        })
        .await
    }

    async fn journal_range(&self, start: u64, end: u64) -> Result<Vec<JournalEntry>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT height, entry_point, caller, value, at FROM journal
                 WHERE height >= ?1 AND height <= ?2 ORDER BY height",
            )?;
            let entries = stmt
                .query_map(params![start, end], row_to_entry)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
        .await
    }

    async fn journal_head(&self) -> Result<Option<u64>> {
        self.with_conn(|conn| {
            let head: Option<u64> =
                conn.query_row("SELECT MAX(height) FROM journal", [], |row| row.get(0))?;
            Ok(head)
        })
        .await
    }
}
