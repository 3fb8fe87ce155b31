//! Oracle protocol message types.
//!
//! Requests are identified by the Blake3 hash of their canonical CBOR
//! encoding. Fulfilments are signed over theirs.

use std::fmt;

use serde::{Deserialize, Serialize};

use tproof_core::{CanonicalMap, ContentHash, CoreError, Principal, Signature, Timestamp};
use tproof_registry::VerificationRequest;

/// Domain separator for request ids.
const REQUEST_DOMAIN: &[u8] = b"tproof-oracle-request-v0";

/// Message size limits.
pub mod limits {
    /// Max bytes of a claimed URL.
    pub const MAX_URL_LEN: usize = 2048;
    /// Max bytes of a storage type name.
    pub const MAX_STORAGE_TYPE_LEN: usize = 64;
    /// Max bytes of a job id.
    pub const MAX_JOB_ID_LEN: usize = 128;
}

/// Identifier of one oracle request.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub [u8; 32]);

impl RequestId {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestId({})", &hex::encode(self.0)[..16])
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// What the oracle is asked to check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRequest {
    pub job_id: String,
    pub hash: ContentHash,
    /// Claimed location. Empty when the storage handler locates the content.
    pub url: String,
    pub storage_type: String,
    pub handler: Principal,
    pub requested_at: Timestamp,
    pub expires_at: Timestamp,
    /// The url-verifier router that will resolve the answer.
    pub verifier: Principal,
}

impl OracleRequest {
    /// Build the oracle request for a queued verification.
    pub fn new(job_id: impl Into<String>, request: VerificationRequest) -> Self {
        Self {
            job_id: job_id.into(),
            hash: request.hash,
            url: request.url,
            storage_type: request.storage_type,
            handler: request.handler,
            requested_at: request.requested_at,
            expires_at: request.expires_at,
            verifier: request.verifier,
        }
    }

    /// Canonical CBOR bytes.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, CoreError> {
        CanonicalMap::new()
            .text(0, &self.job_id)
            .bytes(1, self.hash.as_bytes())
            .text(2, &self.url)
            .text(3, &self.storage_type)
            .bytes(4, self.handler.as_bytes())
            .int(5, self.requested_at)
            .int(6, self.expires_at)
            .bytes(7, self.verifier.as_bytes())
            .encode()
    }

    /// Blake3 over the domain separator and the canonical bytes.
    pub fn id(&self) -> Result<RequestId, CoreError> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(REQUEST_DOMAIN);
        hasher.update(&self.canonical_bytes()?);
        Ok(RequestId(*hasher.finalize().as_bytes()))
    }

    /// Check size limits.
    pub fn validate_limits(&self) -> Result<(), &'static str> {
        if self.url.len() > limits::MAX_URL_LEN {
            return Err("url too long");
        }
        if self.storage_type.len() > limits::MAX_STORAGE_TYPE_LEN {
            return Err("storage type too long");
        }
        if self.job_id.len() > limits::MAX_JOB_ID_LEN {
            return Err("job id too long");
        }
        Ok(())
    }
}

/// The oracle's answer to one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fulfilment {
    pub request_id: RequestId,
    pub hash: ContentHash,
    /// Whether the content at the location hashed to `hash`.
    pub matched: bool,
}

impl Fulfilment {
    /// The bytes the oracle signs.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, CoreError> {
        CanonicalMap::new()
            .bytes(0, self.request_id.as_bytes())
            .bytes(1, self.hash.as_bytes())
            .bool(2, self.matched)
            .encode()
    }
}

/// Oracle protocol messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OracleMessage {
    /// Ask the oracle to check a location.
    Request { id: RequestId, request: OracleRequest },

    /// The oracle's signed answer.
    Fulfil {
        fulfilment: Fulfilment,
        signature: Signature,
    },
}
