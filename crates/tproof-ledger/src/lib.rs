//! # tProof Ledger
//!
//! The certificate ledger: mints proof-of-existence certificates, tracks
//! ownership, and lets owners edit titles and descriptions.
//!
//! ## Key Types
//!
//! - [`TokenLedger`] - Certificates keyed by chain-scoped [`TokenId`]
//! - [`Certificate`] - One minted record
//! - [`TokenUriGenerator`] - Seam for rendering token URIs
//! - [`CollectionAliases`] - Human-readable names for ledger instances
//!
//! ## Identifiers
//!
//! Each ledger numbers its certificates from 0 and publishes them under its
//! chain scope, so independently deployed ledgers never collide. Callers may
//! refer to a certificate by sequence number or by encoded identifier; every
//! operation normalizes first.
//!
//! [`TokenId`]: tproof_core::TokenId

pub mod alias;
pub mod certificate;
pub mod ledger;
pub mod uri;

pub use alias::CollectionAliases;
pub use certificate::Certificate;
pub use ledger::{LedgerConfig, TokenLedger};
pub use uri::{BaseUrlGenerator, TokenUriGenerator};
