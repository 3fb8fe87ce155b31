//! # tProof
//!
//! The unified API for tProof: certificates of existence for content
//! hashes, with optional verification that a stored file matches its hash.
//!
//! ## Overview
//!
//! tProof deploys four cooperating components and hosts them on a
//! [`Chain`]:
//!
//! - **Ledger**: certificates with chain-scoped identifiers, titles and owners
//! - **Registry**: which certificates cover which hash, and the verification
//!   record of each hash
//! - **Router**: the paid front door that mints, records and opens
//!   verifications in one call
//! - **Url-verifier router**: forwards verification requests to an oracle and
//!   applies its signed answers
//!
//! ## Key Concepts
//!
//! - **Transaction**: every entry point runs against a copy of the state and
//!   is committed whole or not at all.
//! - **Value**: paid calls debit the caller's account before anything runs,
//!   and a rejected call refunds it.
//! - **Journal**: committed transactions are numbered by height and persisted
//!   with component snapshots through a [`store::Store`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tproof::{Chain, Clock, TProofConfig};
//! use tproof::core::{ContentHash, Principal};
//! use tproof::store::SqliteStore;
//!
//! async fn example() -> tproof::Result<()> {
//!     let admin = Principal::from_bytes([1; 32]);
//!     let user = Principal::from_bytes([2; 32]);
//!
//!     let store = SqliteStore::open("tproof.db")?;
//!     let mut chain = Chain::deploy(&TProofConfig::with_admin(admin), store, Clock::System)?;
//!
//!     chain.create_proofs(
//!         user,
//!         0,
//!         &[ContentHash::digest(b"contract.pdf")],
//!         &["Contract".into()],
//!         &[false],
//!         &["ArweaveV1".into()],
//!         user,
//!         user,
//!     )?;
//!     chain.persist().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `tproof::core` - identifiers, principals, call context, errors
//! - `tproof::access` - role tables and pause flags
//! - `tproof::ledger` - certificate ledger
//! - `tproof::registry` - hash and verification registry
//! - `tproof::router` - certification router and pricing
//! - `tproof::oracle` - url-verifier router and oracle transports
//! - `tproof::store` - storage abstraction and SQLite

pub mod chain;
pub mod clock;
pub mod config;
pub mod deployment;
pub mod error;
pub mod state;

// Re-export component crates
pub use tproof_access as access;
pub use tproof_core as core;
pub use tproof_ledger as ledger;
pub use tproof_oracle as oracle;
pub use tproof_registry as registry;
pub use tproof_router as router;
pub use tproof_store as store;

// Re-export main types for convenience
pub use chain::{Chain, Component};
pub use clock::Clock;
pub use config::{StorageTypeConfig, TProofConfig, ARWEAVE_V1};
pub use deployment::{Addresses, Deployment};
pub use error::{Result, TProofError};
pub use state::{Accounts, ChainState};

// Re-export commonly used core types
pub use tproof_core::{
    Amount, CallContext, ContentHash, ContractError, ErrorKind, Keypair, NftNum, Principal,
    Timestamp, TokenId,
};
