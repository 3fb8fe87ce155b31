//! Token URI rendering.
//!
//! The ledger does not render metadata itself. It delegates to a generator
//! component that is configured by address; the caller supplies the
//! generator instance and the ledger checks it is the configured one.

use tproof_core::{ContractError, Principal, Result, TokenId};

use crate::ledger::TokenLedger;

/// Renders the URI of a certificate.
pub trait TokenUriGenerator {
    /// Address this generator is configured under.
    fn principal(&self) -> Principal;

    /// Render the URI of an existing certificate.
    fn render(&self, ledger: &TokenLedger, id: TokenId) -> Result<String>;
}

/// Appends the encoded identifier to a base URL.
#[derive(Debug, Clone)]
pub struct BaseUrlGenerator {
    principal: Principal,
    base_url: String,
}

impl BaseUrlGenerator {
    pub fn new(principal: Principal, base_url: impl Into<String>) -> Self {
        Self {
            principal,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl TokenUriGenerator for BaseUrlGenerator {
    fn principal(&self) -> Principal {
        self.principal
    }

    fn render(&self, ledger: &TokenLedger, id: TokenId) -> Result<String> {
        if !ledger.exists(id) {
            return Err(ContractError::NotFound(format!("certificate {id}")));
        }
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), id))
    }
}
