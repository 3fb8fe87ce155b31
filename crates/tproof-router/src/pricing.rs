//! Pricing parameters.

use serde::{Deserialize, Serialize};

use tproof_core::{Amount, ContractError, Result};

/// Two weeks, the default validity window of a prepaid verification.
pub const DEFAULT_VALIDITY_SECS: u64 = 86_400 * 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingParameters {
    /// Price per minted certificate.
    pub mint_price: Amount,
    /// Price per requested or extended verification.
    pub verification_price: Amount,
    /// Validity of verifications opened by `create_proofs`.
    pub validity_secs: u64,
    /// Whether URL verification is offered at all.
    pub verification_enabled: bool,
}

impl Default for PricingParameters {
    fn default() -> Self {
        Self {
            mint_price: 0,
            verification_price: 0,
            validity_secs: DEFAULT_VALIDITY_SECS,
            verification_enabled: true,
        }
    }
}

impl PricingParameters {
    /// `mints * mint_price + verifications * verification_price`.
    pub fn quote(&self, mints: usize, verifications: usize) -> Result<Amount> {
        let overflow = || ContractError::InvalidState("price overflow".into());
        let mint_total = self
            .mint_price
            .checked_mul(mints as Amount)
            .ok_or_else(overflow)?;
        let verification_total = self
            .verification_price
            .checked_mul(verifications as Amount)
            .ok_or_else(overflow)?;
        mint_total.checked_add(verification_total).ok_or_else(overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote() {
        let pricing = PricingParameters {
            mint_price: 100,
            verification_price: 200,
            ..Default::default()
        };
        assert_eq!(pricing.quote(0, 0).unwrap(), 0);
        assert_eq!(pricing.quote(3, 1).unwrap(), 500);
    }

    #[test]
    fn test_quote_overflow() {
        let pricing = PricingParameters {
            mint_price: Amount::MAX,
            ..Default::default()
        };
        assert!(pricing.quote(2, 0).is_err());
    }
}
