//! Error types for the host.

use thiserror::Error;

use tproof_core::{Amount, ContractError, CoreError, Principal};
use tproof_oracle::OracleError;
use tproof_store::StoreError;

/// Errors that can occur while running transactions or managing state.
#[derive(Debug, Error)]
pub enum TProofError {
    /// A component rejected the call. Nothing was committed.
    #[error("contract error: {0}")]
    Contract(#[from] ContractError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Oracle protocol error.
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    /// Encoding error.
    #[error("encoding error: {0}")]
    Core(#[from] CoreError),

    /// The caller cannot cover the value attached to a call.
    #[error("insufficient funds: {account} holds {balance}, needs {required}")]
    InsufficientFunds {
        account: Principal,
        balance: Amount,
        required: Amount,
    },

    /// A persisted journal disagrees with this chain.
    #[error("journal conflict at height {height}")]
    JournalConflict { height: u64 },

    /// Snapshot encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Bad deployment configuration.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error while reading configuration.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for host operations.
pub type Result<T> = std::result::Result<T, TProofError>;
