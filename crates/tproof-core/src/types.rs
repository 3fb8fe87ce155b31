//! Strong type definitions for tProof.
//!
//! Identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::Principal;
use crate::error::CoreError;

/// Amount of the host ledger's native currency, in its smallest unit.
pub type Amount = u128;

/// Unix time in seconds.
pub type Timestamp = i64;

/// A 32-byte content hash: the thing a certificate attests to.
///
/// tProof does not care which hash function produced it; callers bring
/// their own digest. [`ContentHash::digest`] is offered for convenience.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Blake3 digest of the given content.
    pub fn digest(content: &[u8]) -> Self {
        Self(*blake3::hash(content).as_bytes())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s.trim_start_matches("0x"))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidHex(hex::FromHexError::InvalidStringLength))?;
        Ok(Self(arr))
    }

    /// The zero hash (sentinel).
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl AsRef<[u8]> for ContentHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for ContentHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Who is calling, with how much value attached, and when.
///
/// The host supplies one of these for every entry point call. Components
/// never read a clock or a balance on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// The immediate caller.
    pub caller: Principal,
    /// Value attached to the call.
    pub value: Amount,
    /// Current time (Unix seconds).
    pub now: Timestamp,
}

impl CallContext {
    /// A call with no value attached.
    pub fn new(caller: Principal, now: Timestamp) -> Self {
        Self {
            caller,
            value: 0,
            now,
        }
    }

    /// Attach value to the call.
    pub fn with_value(mut self, value: Amount) -> Self {
        self.value = value;
        self
    }

    /// The same call, forwarded by `caller` without value.
    ///
    /// Used when one component calls another: the callee sees the
    /// forwarding component as its caller.
    pub fn forwarded_by(&self, caller: Principal) -> Self {
        Self {
            caller,
            value: 0,
            now: self.now,
        }
    }
}
