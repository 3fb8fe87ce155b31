//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use tproof_core::Timestamp;

use crate::error::{Result, StoreError};
use crate::traits::{InsertResult, JournalEntry, Snapshot, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Latest snapshot per component.
    snapshots: BTreeMap<String, Snapshot>,

    /// Journal indexed by height.
    journal: BTreeMap<u64, JournalEntry>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|_| StoreError::InvalidData("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|_| StoreError::InvalidData("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn put_snapshot(
        &self,
        component: &str,
        height: u64,
        bytes: &[u8],
        saved_at: Timestamp,
    ) -> Result<()> {
        let snapshot = Snapshot {
            component: component.to_owned(),
            height,
            bytes: Bytes::copy_from_slice(bytes),
            saved_at,
        };
        self.write()?.snapshots.insert(component.to_owned(), snapshot);
        Ok(())
    }

    async fn get_snapshot(&self, component: &str) -> Result<Option<Snapshot>> {
        Ok(self.read()?.snapshots.get(component).cloned())
    }

    async fn list_snapshots(&self) -> Result<Vec<String>> {
        Ok(self.read()?.snapshots.keys().cloned().collect())
    }

    async fn append_journal(&self, entry: &JournalEntry) -> Result<InsertResult> {
        let mut inner = self.write()?;
        match inner.journal.get(&entry.height) {
            Some(existing) if existing == entry => Ok(InsertResult::AlreadyExists),
            Some(existing) => Ok(InsertResult::Conflict {
                existing: existing.clone(),
            }),
            None => {
                inner.journal.insert(entry.height, entry.clone());
                Ok(InsertResult::Inserted)
            }
        }
    }

    async fn journal_range(&self, start: u64, end: u64) -> Result<Vec<JournalEntry>> {
        if start > end {
            return Ok(Vec::new());
        }
        Ok(self
            .read()?
            .journal
            .range(start..=end)
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    async fn journal_head(&self) -> Result<Option<u64>> {
        Ok(self.read()?.journal.keys().next_back().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StoreExt;
    use tproof_core::Principal;

    fn entry(height: u64, entry_point: &str) -> JournalEntry {
        JournalEntry {
            height,
            entry_point: entry_point.into(),
            caller: Principal::from_bytes([1; 32]),
            value: 0,
            at: 1_700_000_000,
        }
    }

    #[tokio::test]
    async fn test_snapshot_latest_wins() {
        let store = MemoryStore::new();
        store.put_snapshot("ledger", 1, b"one", 10).await.unwrap();
        store.put_snapshot("ledger", 2, b"two", 20).await.unwrap();

        let snapshot = store.get_snapshot("ledger").await.unwrap().unwrap();
        assert_eq!(snapshot.height, 2);
        assert_eq!(&snapshot.bytes[..], b"two");
        assert!(store.get_snapshot("registry").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_snapshots_and_list() {
        let store = MemoryStore::new();
        store
            .put_snapshots(3, &[("router", vec![1]), ("ledger", vec![2])], 0)
            .await
            .unwrap();
        assert_eq!(
            store.list_snapshots().await.unwrap(),
            vec!["ledger".to_string(), "router".to_string()]
        );
    }

    #[tokio::test]
    async fn test_journal_idempotent_and_conflict() {
        let store = MemoryStore::new();
        assert_eq!(
            store.append_journal(&entry(1, "mint")).await.unwrap(),
            InsertResult::Inserted
        );
        assert_eq!(
            store.append_journal(&entry(1, "mint")).await.unwrap(),
            InsertResult::AlreadyExists
        );
        assert_eq!(
            store.append_journal(&entry(1, "withdraw")).await.unwrap(),
            InsertResult::Conflict {
                existing: entry(1, "mint")
            }
        );
    }

    #[tokio::test]
    async fn test_journal_range_and_head() {
        let store = MemoryStore::new();
        assert_eq!(store.journal_head().await.unwrap(), None);
        for h in 1..=5 {
            store.append_journal(&entry(h, "mint")).await.unwrap();
        }

        let range = store.journal_range(2, 4).await.unwrap();
        assert_eq!(range.iter().map(|e| e.height).collect::<Vec<_>>(), vec![2, 3, 4]);
        assert!(store.journal_range(4, 2).await.unwrap().is_empty());
        assert_eq!(store.journal_head().await.unwrap(), Some(5));
        assert_eq!(store.journal().await.unwrap().len(), 5);
    }
}
