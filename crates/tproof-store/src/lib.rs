//! # tProof Store
//!
//! Persistence for component state. Provides a trait-based interface with
//! SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The host serializes each component (ledger, registry, router, ...) into
//! an opaque snapshot and saves it under the component's name, tagged with
//! the transaction height it reflects. Every committed transaction is also
//! appended to a journal.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`Snapshot`] - A saved component state
//! - [`JournalEntry`] - One committed transaction
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tproof_store::{SqliteStore, Store};
//!
//! async fn example() {
//!     let store = SqliteStore::open("tproof.db").unwrap();
//!     store.put_snapshot("ledger", 7, b"cbor", 1_700_000_000).await.unwrap();
//!     let snapshot = store.get_snapshot("ledger").await.unwrap();
//!     assert_eq!(snapshot.map(|s| s.height), Some(7));
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Latest wins**: a component has one snapshot; saving replaces it
//! - **Idempotent journal**: appending the same entry twice returns `AlreadyExists`
//! - **Conflict detection**: a different entry at an existing height returns `Conflict`

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{InsertResult, JournalEntry, Snapshot, Store, StoreExt};
