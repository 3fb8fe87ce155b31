//! # tProof Testkit
//!
//! Testing utilities for tProof.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known inputs with expected outputs for the
//!   certificate identifier encoding, content hashing and oracle keys
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A deployed, funded chain with a scripted oracle
//!
//! ## Golden Vectors
//!
//! Golden vectors pin the encodings other implementations must agree on:
//!
//! ```rust
//! use tproof_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok, got) in verify_all_vectors().unwrap() {
//!     assert!(ok, "{name}: got {got}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use tproof_testkit::generators::token_id;
//!
//! proptest! {
//!     #[test]
//!     fn decimal_form_parses_back(id in token_id()) {
//!         prop_assert_eq!(id.to_string().parse::<TokenId>().unwrap(), id);
//!     }
//! }
//! ```
//!
//! ## Fixtures
//!
//! ```rust,ignore
//! use tproof_testkit::TestFixture;
//!
//! let mut fixture = TestFixture::new();
//! let (hash, id) = fixture.certify(b"report.pdf", true)?;
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, OracleLink, TestFixture};
