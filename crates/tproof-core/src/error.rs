//! Error types for tProof Core.

use thiserror::Error;

use crate::crypto::Principal;
use crate::token_id::TokenId;
use crate::types::Amount;

/// Errors from parsing and encoding primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid token id: {0}")]
    InvalidTokenId(String),

    #[error("encoding error: {0}")]
    EncodingError(String),
}

/// Failures of contract entry points.
///
/// Every check that produces one of these runs before any state is
/// mutated, so a failed call has no effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// Caller lacks the role the operation requires.
    #[error("access denied: account {account} is missing role {role}")]
    AccessDenied { account: Principal, role: String },

    /// Input collections that correspond element-wise differ in length.
    #[error("all arrays must have same length: expected {expected}, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    /// Attached value is not exactly the required amount.
    #[error("incorrect payment: required {required}, sent {sent}")]
    IncorrectPayment { required: Amount, sent: Amount },

    /// The component is paused.
    #[error("paused")]
    Paused,

    /// The URL verification service is switched off.
    #[error("url verification service disabled")]
    ServiceDisabled,

    /// Caller does not own the certificate.
    #[error("only owner can modify certificate {token_id} (caller {caller})")]
    NotOwner { token_id: TokenId, caller: Principal },

    /// A dependency has not been configured.
    #[error("{0} not initialized")]
    Uninitialized(&'static str),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Fieldless discriminant of [`ContractError`] for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AccessDenied,
    ArityMismatch,
    IncorrectPayment,
    Paused,
    ServiceDisabled,
    NotOwner,
    Uninitialized,
    NotFound,
    InvalidState,
}

impl ContractError {
    /// The kind of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContractError::AccessDenied { .. } => ErrorKind::AccessDenied,
            ContractError::ArityMismatch { .. } => ErrorKind::ArityMismatch,
            ContractError::IncorrectPayment { .. } => ErrorKind::IncorrectPayment,
            ContractError::Paused => ErrorKind::Paused,
            ContractError::ServiceDisabled => ErrorKind::ServiceDisabled,
            ContractError::NotOwner { .. } => ErrorKind::NotOwner,
            ContractError::Uninitialized(_) => ErrorKind::Uninitialized,
            ContractError::NotFound(_) => ErrorKind::NotFound,
            ContractError::InvalidState(_) => ErrorKind::InvalidState,
        }
    }
}

/// Result type for contract entry points.
pub type Result<T> = std::result::Result<T, ContractError>;
