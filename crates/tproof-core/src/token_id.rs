//! Chain-scoped certificate identifiers.
//!
//! A certificate is numbered by its ledger with a sequence number (the
//! "nft number", starting at 0). Its public identifier folds in the chain
//! scope so that independently deployed ledgers never collide:
//!
//! ```text
//! id = BASE + nft_number + BASE * (chain_scope - 1)
//!    = BASE * chain_scope + nft_number            BASE = 10^50
//! ```
//!
//! Sequence numbers are `u128`, which is always below `10^50`, so an
//! identifier is exactly the pair `(chain_scope, nft_number)`. Its decimal
//! rendering is the scope followed by the sequence number zero-padded to
//! fifty digits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Number of decimal digits in `BASE = 10^50`.
pub const BASE_DIGITS: usize = 50;

/// An encoded, chain-scoped certificate identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId {
    chain_scope: u64,
    nft_number: u128,
}

impl TokenId {
    /// Encode a sequence number under a chain scope.
    ///
    /// Returns `None` for scope 0, which has no encoded form.
    pub const fn encode(nft_number: u128, chain_scope: u64) -> Option<Self> {
        if chain_scope == 0 {
            return None;
        }
        Some(Self {
            chain_scope,
            nft_number,
        })
    }

    /// The chain scope the identifier was minted under.
    pub const fn chain_scope(&self) -> u64 {
        self.chain_scope
    }

    /// The per-ledger sequence number.
    pub const fn nft_number(&self) -> u128 {
        self.nft_number
    }

    /// The next identifier in the same scope.
    pub fn next(&self) -> Option<Self> {
        self.nft_number.checked_add(1).map(|n| Self {
            chain_scope: self.chain_scope,
            nft_number: n,
        })
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:0width$}", self.chain_scope, self.nft_number, width = BASE_DIGITS)
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId(scope={}, n={})", self.chain_scope, self.nft_number)
    }
}

impl FromStr for TokenId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<NftNum>()? {
            NftNum::Encoded(id) => Ok(id),
            NftNum::Raw(_) => Err(CoreError::InvalidTokenId(format!(
                "{s} is below 10^{BASE_DIGITS} and is not an encoded identifier"
            ))),
        }
    }
}

/// A value that is either a raw sequence number or an encoded identifier.
///
/// Callers may refer to a certificate either way; ledgers normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NftNum {
    /// A sequence number, `< 10^50`.
    Raw(u128),
    /// An encoded identifier, `>= 10^50`.
    Encoded(TokenId),
}

impl NftNum {
    /// Return the encoded identifier, encoding raw numbers under `chain_scope`.
    ///
    /// Already-encoded identifiers are returned unchanged, whatever their scope.
    pub fn normalize(self, chain_scope: u64) -> Option<TokenId> {
        match self {
            NftNum::Encoded(id) => Some(id),
            NftNum::Raw(n) => TokenId::encode(n, chain_scope),
        }
    }
}

impl From<u128> for NftNum {
    fn from(n: u128) -> Self {
        NftNum::Raw(n)
    }
}

impl From<u64> for NftNum {
    fn from(n: u64) -> Self {
        NftNum::Raw(n.into())
    }
}

impl From<TokenId> for NftNum {
    fn from(id: TokenId) -> Self {
        NftNum::Encoded(id)
    }
}

impl FromStr for NftNum {
    type Err = CoreError;

    /// Parse a decimal value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidTokenId(format!("not a decimal number: {s:?}")));
        }
        let digits = s.trim_start_matches('0');

        if digits.len() <= BASE_DIGITS {
            let n = if digits.is_empty() {
                0
            } else {
                digits
                    .parse::<u128>()
                    .map_err(|_| CoreError::InvalidTokenId(format!("sequence number too large: {s}")))?
            };
            return Ok(NftNum::Raw(n));
        }

        let (scope, number) = digits.split_at(digits.len() - BASE_DIGITS);
        let chain_scope = scope
            .parse::<u64>()
            .map_err(|_| CoreError::InvalidTokenId(format!("chain scope too large: {s}")))?;
        let nft_number = number
            .parse::<u128>()
            .map_err(|_| CoreError::InvalidTokenId(format!("sequence number too large: {s}")))?;

        // digits has no leading zero, so chain_scope >= 1
        Ok(NftNum::Encoded(TokenId {
            chain_scope,
            nft_number,
        }))
    }
}

impl fmt::Display for NftNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NftNum::Raw(n) => write!(f, "{n}"),
            NftNum::Encoded(id) => write!(f, "{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn base() -> String {
        format!("1{}", "0".repeat(BASE_DIGITS))
    }

    #[test]
    fn test_first_id_of_scope_one_is_base() {
        let id = TokenId::encode(0, 1).unwrap();
        assert_eq!(id.to_string(), base());
    }

    #[test]
    fn test_scope_zero_has_no_encoding() {
        assert!(TokenId::encode(5, 0).is_none());
        assert!(NftNum::Raw(5).normalize(0).is_none());
    }

    #[test]
    fn test_encoding_matches_formula() {
        // 10^50 + 7 + 10^50 * (1337 - 1) = 1337 * 10^50 + 7
        let id = TokenId::encode(7, 1337).unwrap();
        assert_eq!(id.to_string(), format!("1337{:050}", 7));
    }

    #[test]
    fn test_normalize_returns_encoded_unchanged() {
        let id = TokenId::encode(42, 5).unwrap();
        assert_eq!(NftNum::from(id).normalize(1337), Some(id));
    }

    #[test]
    fn test_normalize_raw_matches_direct_encoding() {
        assert_eq!(NftNum::Raw(42).normalize(5), TokenId::encode(42, 5));
    }

    #[test]
    fn test_parse_raw_and_encoded() {
        assert_eq!("0".parse::<NftNum>().unwrap(), NftNum::Raw(0));
        assert_eq!("000".parse::<NftNum>().unwrap(), NftNum::Raw(0));
        assert_eq!("12".parse::<NftNum>().unwrap(), NftNum::Raw(12));
        assert_eq!(
            base().parse::<NftNum>().unwrap(),
            NftNum::Encoded(TokenId::encode(0, 1).unwrap())
        );
        // 10^50 - 1 is still a raw number, but does not fit u128
        assert!("9".repeat(BASE_DIGITS).parse::<NftNum>().is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<NftNum>().is_err());
        assert!("12a".parse::<NftNum>().is_err());
        assert!("-1".parse::<NftNum>().is_err());
        assert!("5".parse::<TokenId>().is_err());
    }

    #[test]
    fn test_ordering_follows_numeric_value() {
        let a = TokenId::encode(u128::MAX, 1).unwrap();
        let b = TokenId::encode(0, 2).unwrap();
        assert!(a < b);
        assert_eq!(a.next(), None);
    }

    proptest! {
        #[test]
        fn prop_display_parse_roundtrip(n in any::<u128>(), scope in 1u64..=u64::MAX) {
            let id = TokenId::encode(n, scope).unwrap();
            let parsed: TokenId = id.to_string().parse().unwrap();
            prop_assert_eq!(parsed, id);
        }

        #[test]
        fn prop_scopes_never_collide(n1 in any::<u128>(), n2 in any::<u128>(), s1 in 1u64..1000, s2 in 1u64..1000) {
            prop_assume!(s1 != s2);
            let a = TokenId::encode(n1, s1).unwrap();
            let b = TokenId::encode(n2, s2).unwrap();
            prop_assert_ne!(a.to_string(), b.to_string());
        }
    }
}
