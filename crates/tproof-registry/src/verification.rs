//! Verification records and requests.

use serde::{Deserialize, Serialize};

use tproof_core::{ContentHash, Principal, Timestamp};

/// Observable state of a verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationStatus {
    Pending,
    Verified,
    Failed,
    /// Pending past its expiry. Never stored.
    Expired,
}

/// What the oracle reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationOutcome {
    Verified,
    Failed,
}

impl From<VerificationOutcome> for VerificationStatus {
    fn from(outcome: VerificationOutcome) -> Self {
        match outcome {
            VerificationOutcome::Verified => VerificationStatus::Verified,
            VerificationOutcome::Failed => VerificationStatus::Failed,
        }
    }
}

impl From<bool> for VerificationOutcome {
    fn from(matched: bool) -> Self {
        if matched {
            VerificationOutcome::Verified
        } else {
            VerificationOutcome::Failed
        }
    }
}

/// The verification of one hash against a claimed URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub hash: ContentHash,
    pub url: String,
    pub storage_type: String,
    pub requested_at: Timestamp,
    pub expires_at: Timestamp,
    /// Stored status: Pending, Verified or Failed.
    pub(crate) status: VerificationStatus,
}

impl VerificationRecord {
    /// A Pending record whose expiry has passed.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.status == VerificationStatus::Pending && now > self.expires_at
    }

    /// Status as observed at `now`.
    pub fn status_at(&self, now: Timestamp) -> VerificationStatus {
        if self.is_expired(now) {
            VerificationStatus::Expired
        } else {
            self.status
        }
    }

    /// Pending and not expired at `now`.
    pub fn is_open(&self, now: Timestamp) -> bool {
        self.status_at(now) == VerificationStatus::Pending
    }
}

/// An outbound request for the oracle, queued when a verification opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub hash: ContentHash,
    pub url: String,
    pub storage_type: String,
    /// Handler registered for `storage_type` when the request was made.
    pub handler: Principal,
    pub requested_at: Timestamp,
    pub expires_at: Timestamp,
    /// The URL-verifier router the request is addressed to.
    pub verifier: Principal,
}

/// `now + secs`, saturating.
pub(crate) fn deadline(now: Timestamp, secs: u64) -> Timestamp {
    now.saturating_add(i64::try_from(secs).unwrap_or(i64::MAX))
}
