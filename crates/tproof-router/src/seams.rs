//! The public contracts the router drives its components through.
//!
//! The router never reaches into another component's state. It sees the
//! ledger and the registry only as these traits, implemented here for the
//! concrete components.

use tproof_core::{CallContext, ContentHash, NftNum, Principal, Result, Timestamp, TokenId};
use tproof_ledger::TokenLedger;
use tproof_registry::HashRegistry;

/// What the router needs from a certificate ledger.
pub trait CertificateLedger {
    fn principal(&self) -> Principal;

    /// Check that a mint of `count` certificates would be accepted.
    fn check_mint(&self, ctx: &CallContext, count: usize) -> Result<()>;

    fn mint(
        &mut self,
        ctx: &CallContext,
        owner: Principal,
        hashes: &[ContentHash],
        titles: &[String],
    ) -> Result<Vec<TokenId>>;

    fn update_title(&mut self, ctx: &CallContext, ids: &[NftNum], titles: &[String]) -> Result<()>;

    /// The content hash a certificate attests to.
    fn hash_of(&self, id: NftNum) -> Result<ContentHash>;
}

/// What the router needs from a hash registry.
pub trait VerificationBook {
    fn principal(&self) -> Principal;

    fn check_record_certification(&self, ctx: &CallContext) -> Result<()>;

    fn record_certification(&mut self, ctx: &CallContext, hash: ContentHash, id: TokenId) -> Result<()>;

    fn check_open_verification(
        &self,
        ctx: &CallContext,
        hash: &ContentHash,
        storage_type: &str,
    ) -> Result<()>;

    fn open_verification(
        &mut self,
        ctx: &CallContext,
        hash: ContentHash,
        url: &str,
        storage_type: &str,
        validity_secs: u64,
    ) -> Result<()>;

    fn check_extend_verification(&self, ctx: &CallContext, hash: &ContentHash) -> Result<()>;

    fn extend_verification(
        &mut self,
        ctx: &CallContext,
        hash: &ContentHash,
        extra_secs: u64,
    ) -> Result<Timestamp>;
}

impl CertificateLedger for TokenLedger {
    fn principal(&self) -> Principal {
        TokenLedger::principal(self)
    }

    fn check_mint(&self, ctx: &CallContext, count: usize) -> Result<()> {
        TokenLedger::check_mint(self, ctx, count, count)
    }

    fn mint(
        &mut self,
        ctx: &CallContext,
        owner: Principal,
        hashes: &[ContentHash],
        titles: &[String],
    ) -> Result<Vec<TokenId>> {
        TokenLedger::mint(self, ctx, owner, hashes, titles)
    }

    fn update_title(&mut self, ctx: &CallContext, ids: &[NftNum], titles: &[String]) -> Result<()> {
        TokenLedger::update_title(self, ctx, ids, titles)
    }

    fn hash_of(&self, id: NftNum) -> Result<ContentHash> {
        self.data(id).map(|cert| cert.hash)
    }
}

impl VerificationBook for HashRegistry {
    fn principal(&self) -> Principal {
        HashRegistry::principal(self)
    }

    fn check_record_certification(&self, ctx: &CallContext) -> Result<()> {
        HashRegistry::check_record_certification(self, ctx)
    }

    fn record_certification(&mut self, ctx: &CallContext, hash: ContentHash, id: TokenId) -> Result<()> {
        HashRegistry::record_certification(self, ctx, hash, id)
    }

    fn check_open_verification(
        &self,
        ctx: &CallContext,
        hash: &ContentHash,
        storage_type: &str,
    ) -> Result<()> {
        HashRegistry::check_open_verification(self, ctx, hash, storage_type)
    }

    fn open_verification(
        &mut self,
        ctx: &CallContext,
        hash: ContentHash,
        url: &str,
        storage_type: &str,
        validity_secs: u64,
    ) -> Result<()> {
        HashRegistry::open_verification(self, ctx, hash, url, storage_type, validity_secs)
    }

    fn check_extend_verification(&self, ctx: &CallContext, hash: &ContentHash) -> Result<()> {
        HashRegistry::check_extend_verification(self, ctx, hash)
    }

    fn extend_verification(
        &mut self,
        ctx: &CallContext,
        hash: &ContentHash,
        extra_secs: u64,
    ) -> Result<Timestamp> {
        HashRegistry::extend_verification(self, ctx, hash, extra_secs)
    }
}
