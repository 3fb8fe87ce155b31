//! Store trait: the abstract interface for state persistence.
//!
//! This trait keeps the host storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use tproof_core::{Amount, Principal, Timestamp};

use crate::error::Result;

/// Result of appending a journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// Entry was appended.
    Inserted,
    /// The same entry already exists (idempotent, not an error).
    AlreadyExists,
    /// A different entry exists at the same height.
    Conflict {
        /// The existing entry.
        existing: JournalEntry,
    },
}

/// The saved state of one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Component name, e.g. `ledger`.
    pub component: String,
    /// Transaction height the state reflects.
    pub height: u64,
    /// Opaque encoded state.
    pub bytes: Bytes,
    /// When the snapshot was saved.
    pub saved_at: Timestamp,
}

/// One committed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Position in the journal, starting at 1.
    pub height: u64,
    /// Name of the entry point, e.g. `create_proofs`.
    pub entry_point: String,
    pub caller: Principal,
    pub value: Amount,
    pub at: Timestamp,
}

/// The Store trait: async interface for state persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Snapshot Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Save a component's state, replacing any earlier snapshot of it.
    async fn put_snapshot(
        &self,
        component: &str,
        height: u64,
        bytes: &[u8],
        saved_at: Timestamp,
    ) -> Result<()>;

    /// Load a component's latest snapshot.
    async fn get_snapshot(&self, component: &str) -> Result<Option<Snapshot>>;

    /// Names of all components with a snapshot, sorted.
    async fn list_snapshots(&self) -> Result<Vec<String>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Journal Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a committed transaction.
    ///
    /// # Returns
    /// - `Inserted` if the height was free.
    /// - `AlreadyExists` if the exact same entry is already there.
    /// - `Conflict` if a different entry holds that height.
    async fn append_journal(&self, entry: &JournalEntry) -> Result<InsertResult>;

    /// Entries with `start <= height <= end`, ordered by height.
    async fn journal_range(&self, start: u64, end: u64) -> Result<Vec<JournalEntry>>;

    /// Highest journaled height, if any.
    async fn journal_head(&self) -> Result<Option<u64>>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// Save several component snapshots at the same height.
    fn put_snapshots(
        &self,
        height: u64,
        snapshots: &[(&str, Vec<u8>)],
        saved_at: Timestamp,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// The whole journal, ordered by height.
    fn journal(&self) -> impl std::future::Future<Output = Result<Vec<JournalEntry>>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn put_snapshots(
        &self,
        height: u64,
        snapshots: &[(&str, Vec<u8>)],
        saved_at: Timestamp,
    ) -> Result<()> {
        for (component, bytes) in snapshots {
            self.put_snapshot(component, height, bytes, saved_at).await?;
        }
        Ok(())
    }

    async fn journal(&self) -> Result<Vec<JournalEntry>> {
        match self.journal_head().await? {
            Some(head) => self.journal_range(1, head).await,
            None => Ok(Vec::new()),
        }
    }
}
