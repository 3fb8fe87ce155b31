//! Deployment configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use tproof_core::{Principal, Timestamp};
use tproof_ledger::LedgerConfig;
use tproof_oracle::OracleConfig;
use tproof_router::PricingParameters;

use crate::error::{Result, TProofError};

/// Storage type registered at deployment.
pub const ARWEAVE_V1: &str = "ArweaveV1";

/// A storage type and the handler that locates content stored under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageTypeConfig {
    pub name: String,
    pub handler: Principal,
}

/// Everything [`Deployment::deploy`](crate::Deployment::deploy) needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TProofConfig {
    /// Receives the admin roles of every component. Must not be zero.
    pub admin: Principal,

    /// Collection name, symbol and chain scope.
    pub ledger: LedgerConfig,

    /// Initial prices, validity window and service switch.
    pub pricing: PricingParameters,

    /// Oracle key and job for the url-verifier router.
    pub oracle: OracleConfig,

    /// Storage types registered at deployment.
    pub storage_types: Vec<StorageTypeConfig>,

    /// Granted the withdraw role on the router, if set.
    pub withdraw_wallet: Option<Principal>,

    /// Base of every token URI.
    pub token_uri_base: String,

    /// Alias given to the collection at deployment, if set.
    pub collection_alias: Option<String>,

    /// Time of the deployment transaction.
    pub genesis_time: Timestamp,
}

impl Default for TProofConfig {
    fn default() -> Self {
        Self {
            admin: Principal::ZERO,
            ledger: LedgerConfig::default(),
            pricing: PricingParameters::default(),
            oracle: OracleConfig::default(),
            storage_types: vec![StorageTypeConfig {
                name: ARWEAVE_V1.into(),
                handler: Principal::derive("tproof-storage", ARWEAVE_V1),
            }],
            withdraw_wallet: None,
            token_uri_base: "https://tproof.io/certificate".into(),
            collection_alias: None,
            genesis_time: 0,
        }
    }
}

impl TProofConfig {
    /// Default configuration administered by `admin`.
    pub fn with_admin(admin: Principal) -> Self {
        Self {
            admin,
            ..Self::default()
        }
    }

    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TProofError::Config(e.to_string()))
    }

    /// Read a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| TProofError::Config(e.to_string()))
    }

    /// Reject configurations that cannot be deployed.
    pub fn validate(&self) -> Result<()> {
        if self.admin == Principal::ZERO {
            return Err(TProofError::Config("admin must not be the zero principal".into()));
        }
        if self.ledger.chain_scope == 0 {
            return Err(TProofError::Config("chain scope must be at least 1".into()));
        }
        if self.withdraw_wallet == Some(Principal::ZERO) {
            return Err(TProofError::Config("withdraw wallet must not be the zero principal".into()));
        }
        if let Some(storage) = self.storage_types.iter().find(|s| s.name.is_empty()) {
            return Err(TProofError::Config(format!(
                "storage type with handler {} has no name",
                storage.handler
            )));
        }
        Ok(())
    }
}
