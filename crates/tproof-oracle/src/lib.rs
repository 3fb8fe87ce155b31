//! # tProof Oracle
//!
//! The URL-verifier router: the only principal allowed to resolve
//! verifications in the hash registry.
//!
//! ## Overview
//!
//! Opening a verification queues a [`VerificationRequest`] in the registry.
//! The host hands it to [`UrlVerifierRouter::dispatch`], which forwards it
//! to the off-chain oracle over an [`OracleTransport`]. The oracle checks
//! the content at the claimed location and answers with a signed
//! [`Fulfilment`]. [`UrlVerifierRouter::fulfil`] checks the request id and
//! the signature before resolving the record.
//!
//! Nothing here waits on the oracle. A verification nobody answers simply
//! expires.
//!
//! ## Message Flow
//!
//! ```text
//! Registry        UrlVerifierRouter            Oracle
//!   |-- request ------->|                         |
//!   |                   |-------- Request ------->|
//!   |                   |<------- Fulfil ---------|
//!   |<-- resolve -------|                         |
//! ```
//!
//! [`VerificationRequest`]: tproof_registry::VerificationRequest

pub mod client;
pub mod error;
pub mod messages;
pub mod mock;
pub mod transport;

pub use client::{OracleConfig, UrlVerifierRouter};
pub use error::{OracleError, Result};
pub use messages::{limits, Fulfilment, OracleMessage, OracleRequest, RequestId};
pub use mock::MockOracle;
pub use transport::{memory::MemoryNetwork, memory::MemoryTransport, OracleTransport};
