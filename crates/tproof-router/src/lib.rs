//! # tProof Router
//!
//! The certification router is the entry point users normally call. It
//! checks pause state, array arity, service state and exact payment, then
//! drives the ledger and the registry through the [`CertificateLedger`] and
//! [`VerificationBook`] seams.
//!
//! The router holds no certificate or hash state: only pricing, its
//! accumulated balance, and the addresses of the components it drives.
//!
//! ## Check Order
//!
//! Every entry point validates the whole batch before mutating anything:
//!
//! 1. pause
//! 2. array arity
//! 3. verification service enabled (verification paths only)
//! 4. exact payment
//! 5. configured component addresses
//! 6. every downstream check, entry by entry
//!
//! The first failure aborts the call.

pub mod pricing;
pub mod router;
pub mod seams;

pub use pricing::PricingParameters;
pub use router::{ProofsCreated, Router};
pub use seams::{CertificateLedger, VerificationBook};
