//! # tProof Core
//!
//! Pure primitives for the tProof certification system: principals,
//! content hashes, chain-scoped certificate identifiers, and the error
//! taxonomy shared by every component.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`Principal`] - A 32-byte identity (Ed25519 public key bytes)
//! - [`ContentHash`] - The hash being certified
//! - [`TokenId`] - Chain-scoped, collision-free certificate identifier
//! - [`NftNum`] - Either a raw sequence number or an encoded identifier
//! - [`CallContext`] - Caller, attached value and time of one call
//! - [`ContractError`] - The failure taxonomy of all entry points
//!
//! ## Identifier Encoding
//!
//! `id = BASE + nft_number + BASE * (chain_scope - 1)` with `BASE = 10^50`.
//! See [`token_id`].

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod token_id;
pub mod types;

pub use canonical::{encode_canonical, CanonicalMap};
pub use crypto::{Keypair, Principal, Signature};
pub use error::{ContractError, CoreError, ErrorKind, Result};
pub use token_id::{NftNum, TokenId, BASE_DIGITS};
pub use types::{Amount, CallContext, ContentHash, Timestamp};

/// Fail with [`ContractError::ArityMismatch`] unless every length equals the first.
///
/// Used at the top of every batch entry point, before any state is touched.
pub fn require_same_len(lens: &[usize]) -> Result<usize> {
    let expected = lens.first().copied().unwrap_or(0);
    match lens.iter().find(|&&len| len != expected) {
        Some(&actual) => Err(ContractError::ArityMismatch { expected, actual }),
        None => Ok(expected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_same_len() {
        assert_eq!(require_same_len(&[2, 2, 2]).unwrap(), 2);
        assert_eq!(require_same_len(&[]).unwrap(), 0);

        let err = require_same_len(&[1, 2]).unwrap_err();
        assert!(matches!(
            err,
            ContractError::ArityMismatch {
                expected: 1,
                actual: 2
            }
        ));
    }
}
