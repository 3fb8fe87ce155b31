//! The certification router.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tproof_access::{
    AccessControl, PauseState, DEFAULT_ADMIN_ROLE, PAUSER_ROLE, PRICING_ADMIN_ROLE, WITHDRAW_ROLE,
};
use tproof_core::{
    require_same_len, Amount, CallContext, ContentHash, ContractError, NftNum, Principal, Result,
    TokenId,
};

use crate::pricing::PricingParameters;
use crate::seams::{CertificateLedger, VerificationBook};

/// Summary of a successful `create_proofs` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofsCreated {
    pub token_ids: Vec<TokenId>,
    pub owner: Principal,
    /// The account on whose behalf payment was made.
    pub payer: Principal,
    pub paid: Amount,
    /// Hashes for which a verification was opened.
    pub verifications: Vec<ContentHash>,
}

/// Pricing, balance and wiring of the certification front door.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Router {
    principal: Principal,
    nft_factory: Option<Principal>,
    hash_registry: Option<Principal>,
    pricing: PricingParameters,
    balance: Amount,
    access: AccessControl,
    paused: PauseState,
}

impl Router {
    /// Create a router. `admin` receives the default admin, pauser and
    /// pricing admin roles.
    pub fn new(
        principal: Principal,
        admin: Principal,
        pricing: PricingParameters,
        nft_factory: Option<Principal>,
        hash_registry: Option<Principal>,
    ) -> Self {
        let mut access = AccessControl::new(admin);
        access.setup_role(PAUSER_ROLE, admin);
        access.setup_role(PRICING_ADMIN_ROLE, admin);

        Self {
            principal,
            nft_factory,
            hash_registry,
            pricing,
            balance: 0,
            access,
            paused: PauseState::default(),
        }
    }

    pub fn principal(&self) -> Principal {
        self.principal
    }

    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Preconditions
    // ─────────────────────────────────────────────────────────────────────────

    fn require_payment(ctx: &CallContext, required: Amount) -> Result<()> {
        if ctx.value != required {
            return Err(ContractError::IncorrectPayment {
                required,
                sent: ctx.value,
            });
        }
        Ok(())
    }

    fn require_service(&self) -> Result<()> {
        if !self.pricing.verification_enabled {
            return Err(ContractError::ServiceDisabled);
        }
        Ok(())
    }

    fn require_ledger(&self, ledger: &dyn CertificateLedger) -> Result<()> {
        match self.nft_factory {
            Some(expected) if expected == ledger.principal() => Ok(()),
            _ => Err(ContractError::Uninitialized("nft factory")),
        }
    }

    fn require_registry(&self, registry: &dyn VerificationBook) -> Result<()> {
        match self.hash_registry {
            Some(expected) if expected == registry.principal() => Ok(()),
            _ => Err(ContractError::Uninitialized("hash registry")),
        }
    }

    /// The context downstream components see: the router as caller, no value.
    fn forwarded(&self, ctx: &CallContext) -> CallContext {
        ctx.forwarded_by(self.principal)
    }

    fn require_distinct(hashes: &[ContentHash]) -> Result<()> {
        let mut seen = BTreeSet::new();
        for hash in hashes {
            if !seen.insert(hash) {
                return Err(ContractError::InvalidState(format!(
                    "verification of {hash} requested twice"
                )));
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Certification
    // ─────────────────────────────────────────────────────────────────────────

    /// Mint certificates for `hashes`, record them, and open the requested
    /// verifications. The attached value must equal the quoted price.
    #[allow(clippy::too_many_arguments)]
    pub fn create_proofs(
        &mut self,
        ctx: &CallContext,
        ledger: &mut dyn CertificateLedger,
        registry: &mut dyn VerificationBook,
        hashes: &[ContentHash],
        titles: &[String],
        with_verification: &[bool],
        storage_types: &[String],
        cert_owner: Principal,
        cert_payer: Principal,
    ) -> Result<ProofsCreated> {
        self.paused.require_not_paused()?;
        let count = require_same_len(&[
            hashes.len(),
            titles.len(),
            with_verification.len(),
            storage_types.len(),
        ])?;

        let requested: Vec<usize> = (0..count).filter(|&i| with_verification[i]).collect();
        if !requested.is_empty() {
            self.require_service()?;
        }
        Self::require_payment(ctx, self.pricing.quote(count, requested.len())?)?;
        let balance = self.credited(ctx)?;

        self.require_ledger(ledger)?;
        self.require_registry(registry)?;
        if cert_owner == Principal::ZERO {
            return Err(ContractError::InvalidState("mint to the zero principal".into()));
        }

        let inner = self.forwarded(ctx);
        ledger.check_mint(&inner, count)?;
        registry.check_record_certification(&inner)?;
        let verified: Vec<ContentHash> = requested.iter().map(|&i| hashes[i]).collect();
        Self::require_distinct(&verified)?;
        for &i in &requested {
            registry.check_open_verification(&inner, &hashes[i], &storage_types[i])?;
        }

        let token_ids = ledger.mint(&inner, cert_owner, hashes, titles)?;
        for (hash, id) in hashes.iter().zip(&token_ids) {
            registry.record_certification(&inner, *hash, *id)?;
        }
        // Content is located through the storage handler, so no URL is claimed.
        for &i in &requested {
            registry.open_verification(
                &inner,
                hashes[i],
                "",
                &storage_types[i],
                self.pricing.validity_secs,
            )?;
        }
        self.balance = balance;

        info!(
            count,
            verifications = verified.len(),
            owner = %cert_owner,
            payer = %cert_payer,
            paid = ctx.value,
            "proofs created"
        );
        Ok(ProofsCreated {
            token_ids,
            owner: cert_owner,
            payer: cert_payer,
            paid: ctx.value,
            verifications: verified,
        })
    }

    /// Retitle certificates on behalf of the caller, who must own them all.
    pub fn edit_proof_title(
        &self,
        ctx: &CallContext,
        ledger: &mut dyn CertificateLedger,
        ids: &[NftNum],
        titles: &[String],
    ) -> Result<()> {
        self.paused.require_not_paused()?;
        require_same_len(&[ids.len(), titles.len()])?;
        Self::require_payment(ctx, 0)?;
        self.require_ledger(ledger)?;

        ledger.update_title(ctx, ids, titles)
    }

    /// Open verifications of the hashes behind `ids` against claimed URLs.
    #[allow(clippy::too_many_arguments)]
    pub fn verify_hash_file_url(
        &self,
        ctx: &CallContext,
        ledger: &dyn CertificateLedger,
        registry: &mut dyn VerificationBook,
        ids: &[NftNum],
        urls: &[String],
        storage_types: &[String],
        validity_secs: &[u64],
    ) -> Result<Vec<ContentHash>> {
        self.paused.require_not_paused()?;
        self.require_service()?;
        require_same_len(&[ids.len(), urls.len(), storage_types.len(), validity_secs.len()])?;
        Self::require_payment(ctx, 0)?;
        self.require_ledger(ledger)?;
        self.require_registry(registry)?;

        let hashes = ids
            .iter()
            .map(|&id| ledger.hash_of(id))
            .collect::<Result<Vec<_>>>()?;
        Self::require_distinct(&hashes)?;

        let inner = self.forwarded(ctx);
        for (hash, storage_type) in hashes.iter().zip(storage_types) {
            registry.check_open_verification(&inner, hash, storage_type)?;
        }
        for (((hash, url), storage_type), &secs) in
            hashes.iter().zip(urls).zip(storage_types).zip(validity_secs)
        {
            registry.open_verification(&inner, *hash, url, storage_type, secs)?;
        }

        info!(count = hashes.len(), by = %ctx.caller, "url verifications requested");
        Ok(hashes)
    }

    /// Push back the expiry of pending verifications. The attached value must
    /// equal `ids.len() * verification_price`.
    pub fn extend_verification(
        &mut self,
        ctx: &CallContext,
        ledger: &dyn CertificateLedger,
        registry: &mut dyn VerificationBook,
        ids: &[NftNum],
        validity_secs: &[u64],
    ) -> Result<Vec<ContentHash>> {
        self.paused.require_not_paused()?;
        self.require_service()?;
        let count = require_same_len(&[ids.len(), validity_secs.len()])?;
        Self::require_payment(ctx, self.pricing.quote(0, count)?)?;
        let balance = self.credited(ctx)?;
        self.require_ledger(ledger)?;
        self.require_registry(registry)?;

        let hashes = ids
            .iter()
            .map(|&id| ledger.hash_of(id))
            .collect::<Result<Vec<_>>>()?;

        let inner = self.forwarded(ctx);
        for hash in &hashes {
            registry.check_extend_verification(&inner, hash)?;
        }
        for (hash, &secs) in hashes.iter().zip(validity_secs) {
            registry.extend_verification(&inner, hash, secs)?;
        }
        self.balance = balance;

        info!(count, paid = ctx.value, "verifications extended");
        Ok(hashes)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pricing
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_mint_price(&mut self, ctx: &CallContext, price: Amount) -> Result<()> {
        self.access.check_role(PRICING_ADMIN_ROLE, &ctx.caller)?;
        self.pricing.mint_price = price;
        info!(price, "mint price set");
        Ok(())
    }

    pub fn set_verification_price(&mut self, ctx: &CallContext, price: Amount) -> Result<()> {
        self.access.check_role(PRICING_ADMIN_ROLE, &ctx.caller)?;
        self.pricing.verification_price = price;
        info!(price, "verification price set");
        Ok(())
    }

    pub fn set_validity_window(&mut self, ctx: &CallContext, secs: u64) -> Result<()> {
        self.access.check_role(PRICING_ADMIN_ROLE, &ctx.caller)?;
        self.pricing.validity_secs = secs;
        info!(secs, "validity window set");
        Ok(())
    }

    /// Flip the verification service on or off. Returns the new state.
    pub fn toggle_url_verification_service(&mut self, ctx: &CallContext) -> Result<bool> {
        self.access.check_role(PRICING_ADMIN_ROLE, &ctx.caller)?;
        self.pricing.verification_enabled = !self.pricing.verification_enabled;
        info!(enabled = self.pricing.verification_enabled, "url verification toggled");
        Ok(self.pricing.verification_enabled)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Funds
    // ─────────────────────────────────────────────────────────────────────────

    /// Accept a plain deposit. Returns the new balance.
    pub fn receive(&mut self, ctx: &CallContext) -> Result<Amount> {
        self.balance = self.credited(ctx)?;
        debug!(from = %ctx.caller, value = ctx.value, "deposit received");
        Ok(self.balance)
    }

    /// The balance once `ctx.value` is accepted.
    fn credited(&self, ctx: &CallContext) -> Result<Amount> {
        self.balance
            .checked_add(ctx.value)
            .ok_or_else(|| ContractError::InvalidState("balance overflow".into()))
    }

    /// Take the whole balance. The host credits it to the caller.
    pub fn withdraw(&mut self, ctx: &CallContext) -> Result<Amount> {
        self.access.check_role(WITHDRAW_ROLE, &ctx.caller)?;
        self.paused.require_not_paused()?;
        Self::require_payment(ctx, 0)?;

        let amount = std::mem::take(&mut self.balance);
        info!(to = %ctx.caller, amount, "balance withdrawn");
        Ok(amount)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Administration
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_nft_factory(&mut self, ctx: &CallContext, ledger: Principal) -> Result<Option<Principal>> {
        self.access.check_role(DEFAULT_ADMIN_ROLE, &ctx.caller)?;
        info!(ledger = %ledger, "nft factory set");
        Ok(self.nft_factory.replace(ledger))
    }

    pub fn set_hash_registry(
        &mut self,
        ctx: &CallContext,
        registry: Principal,
    ) -> Result<Option<Principal>> {
        self.access.check_role(DEFAULT_ADMIN_ROLE, &ctx.caller)?;
        info!(registry = %registry, "hash registry set");
        Ok(self.hash_registry.replace(registry))
    }

    pub fn pause(&mut self, ctx: &CallContext) -> Result<()> {
        self.paused.pause(&self.access, &ctx.caller)
    }

    pub fn unpause(&mut self, ctx: &CallContext) -> Result<()> {
        self.paused.unpause(&self.access, &ctx.caller)
    }

    pub fn grant_role(&mut self, ctx: &CallContext, role: &str, account: Principal) -> Result<bool> {
        self.access.grant_role(&ctx.caller, role, account)
    }

    pub fn revoke_role(&mut self, ctx: &CallContext, role: &str, account: &Principal) -> Result<bool> {
        self.access.revoke_role(&ctx.caller, role, account)
    }

    pub fn renounce_role(&mut self, ctx: &CallContext, role: &str) -> bool {
        self.access.renounce_role(&ctx.caller, role)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn pricing(&self) -> &PricingParameters {
        &self.pricing
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn nft_factory(&self) -> Option<Principal> {
        self.nft_factory
    }

    pub fn hash_registry(&self) -> Option<Principal> {
        self.hash_registry
    }

    pub fn is_paused(&self) -> bool {
        self.paused.is_paused()
    }
}
