//! # tProof Registry
//!
//! The hash registry: which certificates certified which content hash,
//! where certified content is stored, and whether a claimed public URL has
//! been verified to serve it.
//!
//! ## Verification Lifecycle
//!
//! ```text
//! None ──open──> Pending ──resolve──> Verified | Failed
//!                  │  ^
//!                  │  └──extend (before expiry)
//!                  └──(now > expires_at)──> Expired
//! ```
//!
//! Expired is never stored. It is computed from the stored expiry and the
//! caller-supplied time whenever the record is read or resolved. A record
//! that is Verified, Failed or Expired may be replaced by opening a new one.
//!
//! Opening a verification queues a [`VerificationRequest`] addressed to the
//! configured URL-verifier router; the host drains the queue and delivers
//! the requests out of band.

pub mod registry;
pub mod storage;
pub mod verification;

pub use registry::{HashRecord, HashRegistry};
pub use storage::StorageTypeDescriptor;
pub use verification::{
    VerificationOutcome, VerificationRecord, VerificationRequest, VerificationStatus,
};
