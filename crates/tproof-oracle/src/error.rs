//! Error types for the oracle client.

use thiserror::Error;

use tproof_core::{ContractError, CoreError, Principal};

use crate::messages::RequestId;

/// Errors that can occur while talking to the oracle.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Message validation failed.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Transport-level error.
    #[error("transport error: {0}")]
    TransportError(String),

    /// The fulfilment was not signed by the configured oracle key.
    #[error("bad oracle signature")]
    BadSignature,

    /// The fulfilment answers nothing this router asked.
    #[error("unknown request: {0}")]
    UnknownRequest(RequestId),

    /// The request is addressed to another url-verifier router.
    #[error("request addressed to {expected}, not {actual}")]
    Misaddressed { expected: Principal, actual: Principal },

    /// Timeout waiting for the oracle.
    #[error("timeout: {0}")]
    Timeout(String),

    /// The registry refused the resolution.
    #[error("contract error: {0}")]
    Contract(#[from] ContractError),

    /// Encoding failed.
    #[error("encoding error: {0}")]
    Encoding(#[from] CoreError),
}

/// Result type for oracle operations.
pub type Result<T> = std::result::Result<T, OracleError>;
