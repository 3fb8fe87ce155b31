//! The certificate ledger.
//!
//! Every mutating entry point validates its whole input before touching
//! state, so a failed call leaves the ledger exactly as it was.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tproof_access::{AccessControl, PauseState, LEDGER_ADMIN_ROLE, MINT_ROLE, PAUSER_ROLE};
use tproof_core::{
    require_same_len, CallContext, ContentHash, ContractError, NftNum, Principal, Result, TokenId,
};

use crate::certificate::Certificate;
use crate::uri::TokenUriGenerator;

/// Configuration for a ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Collection name.
    pub name: String,
    /// Collection symbol.
    pub symbol: String,
    /// Chain scope folded into every identifier. Must be at least 1.
    pub chain_scope: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            name: "tProof Certificate".into(),
            symbol: "TPROOF".into(),
            chain_scope: 1,
        }
    }
}

/// Certificates of one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedger {
    principal: Principal,
    name: String,
    symbol: String,
    chain_scope: u64,
    /// Indexed by nft number.
    certificates: Vec<Certificate>,
    balances: BTreeMap<Principal, u64>,
    token_uri_generator: Option<Principal>,
    access: AccessControl,
    paused: PauseState,
}

impl TokenLedger {
    /// Create a ledger. `admin` receives the default admin, pauser and
    /// ledger admin roles.
    pub fn new(principal: Principal, admin: Principal, config: LedgerConfig) -> Result<Self> {
        if config.chain_scope == 0 {
            return Err(ContractError::InvalidState("chain scope must be at least 1".into()));
        }

        let mut access = AccessControl::new(admin);
        access.setup_role(PAUSER_ROLE, admin);
        access.setup_role(LEDGER_ADMIN_ROLE, admin);

        Ok(Self {
            principal,
            name: config.name,
            symbol: config.symbol,
            chain_scope: config.chain_scope,
            certificates: Vec::new(),
            balances: BTreeMap::new(),
            token_uri_generator: None,
            access,
            paused: PauseState::default(),
        })
    }

    pub fn principal(&self) -> Principal {
        self.principal
    }

    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Identifiers
    // ─────────────────────────────────────────────────────────────────────────

    /// Return the encoded identifier for a sequence number or identifier.
    pub fn normalize_nft_num(&self, value: impl Into<NftNum>) -> Result<TokenId> {
        value
            .into()
            .normalize(self.chain_scope)
            .ok_or_else(|| ContractError::InvalidState("chain scope must be at least 1".into()))
    }

    fn index_of(&self, id: TokenId) -> Option<usize> {
        if id.chain_scope() != self.chain_scope {
            return None;
        }
        let index = usize::try_from(id.nft_number()).ok()?;
        (index < self.certificates.len()).then_some(index)
    }

    fn lookup(&self, value: impl Into<NftNum>) -> Result<&Certificate> {
        let id = self.normalize_nft_num(value)?;
        self.index_of(id)
            .map(|index| &self.certificates[index])
            .ok_or_else(|| ContractError::NotFound(format!("certificate {id}")))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Minting
    // ─────────────────────────────────────────────────────────────────────────

    /// Check that `mint` would be accepted for the given batch shape.
    pub fn check_mint(&self, ctx: &CallContext, hashes: usize, titles: usize) -> Result<()> {
        self.access.check_role(MINT_ROLE, &ctx.caller)?;
        self.paused.require_not_paused()?;
        require_same_len(&[hashes, titles])?;
        if u64::try_from(self.certificates.len() + hashes).is_err() {
            return Err(ContractError::InvalidState("sequence counter overflow".into()));
        }
        Ok(())
    }

    /// Mint one certificate per hash to `owner`, with consecutive identifiers.
    pub fn mint(
        &mut self,
        ctx: &CallContext,
        owner: Principal,
        hashes: &[ContentHash],
        titles: &[String],
    ) -> Result<Vec<TokenId>> {
        self.check_mint(ctx, hashes.len(), titles.len())?;
        if owner == Principal::ZERO {
            return Err(ContractError::InvalidState("mint to the zero principal".into()));
        }

        let first = self.certificates.len() as u128;
        let ids = (0..hashes.len() as u128)
            .map(|offset| self.normalize_nft_num(first + offset))
            .collect::<Result<Vec<_>>>()?;

        for ((id, hash), title) in ids.iter().zip(hashes).zip(titles) {
            self.certificates
                .push(Certificate::new(*id, owner, *hash, title.clone(), ctx.now));
        }
        *self.balances.entry(owner).or_default() += hashes.len() as u64;

        info!(
            count = ids.len(),
            owner = %owner,
            first = ?ids.first(),
            "minted certificates"
        );
        Ok(ids)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Owner operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve a batch the caller must own entirely.
    fn owned_batch(&self, ctx: &CallContext, ids: &[NftNum], values: usize) -> Result<Vec<usize>> {
        self.paused.require_not_paused()?;
        require_same_len(&[ids.len(), values])?;

        ids.iter()
            .map(|&value| {
                let id = self.normalize_nft_num(value)?;
                let index = self
                    .index_of(id)
                    .ok_or_else(|| ContractError::NotFound(format!("certificate {id}")))?;
                if self.certificates[index].owner != ctx.caller {
                    return Err(ContractError::NotOwner {
                        token_id: id,
                        caller: ctx.caller,
                    });
                }
                Ok(index)
            })
            .collect()
    }

    /// Replace the titles of certificates owned by the caller.
    pub fn update_title(&mut self, ctx: &CallContext, ids: &[NftNum], titles: &[String]) -> Result<()> {
        let indices = self.owned_batch(ctx, ids, titles.len())?;
        for (index, title) in indices.into_iter().zip(titles) {
            self.certificates[index].title = title.clone();
        }
        debug!(count = ids.len(), by = %ctx.caller, "titles updated");
        Ok(())
    }

    /// Replace the descriptions of certificates owned by the caller.
    pub fn set_description(
        &mut self,
        ctx: &CallContext,
        ids: &[NftNum],
        descriptions: &[String],
    ) -> Result<()> {
        let indices = self.owned_batch(ctx, ids, descriptions.len())?;
        for (index, description) in indices.into_iter().zip(descriptions) {
            self.certificates[index].description = description.clone();
        }
        debug!(count = ids.len(), by = %ctx.caller, "descriptions updated");
        Ok(())
    }

    /// Move a certificate owned by the caller to `to`.
    pub fn transfer(&mut self, ctx: &CallContext, to: Principal, id: impl Into<NftNum>) -> Result<()> {
        let index = self.owned_batch(ctx, &[id.into()], 1)?[0];
        if to == Principal::ZERO {
            return Err(ContractError::InvalidState("transfer to the zero principal".into()));
        }

        let from = ctx.caller;
        if from == to {
            return Ok(());
        }
        self.certificates[index].owner = to;
        if let Some(balance) = self.balances.get_mut(&from) {
            *balance -= 1;
            if *balance == 0 {
                self.balances.remove(&from);
            }
        }
        *self.balances.entry(to).or_default() += 1;

        info!(id = %self.certificates[index].id, from = %from, to = %to, "certificate transferred");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Administration
    // ─────────────────────────────────────────────────────────────────────────

    /// Configure the token URI generator. Returns the previous one.
    pub fn set_token_uri_generator(
        &mut self,
        ctx: &CallContext,
        generator: Principal,
    ) -> Result<Option<Principal>> {
        self.access.check_role(LEDGER_ADMIN_ROLE, &ctx.caller)?;
        info!(generator = %generator, "token uri generator set");
        Ok(self.token_uri_generator.replace(generator))
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

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn chain_scope(&self) -> u64 {
        self.chain_scope
    }

    pub fn is_paused(&self) -> bool {
        self.paused.is_paused()
    }

    pub fn token_uri_generator(&self) -> Option<Principal> {
        self.token_uri_generator
    }

    pub fn total_supply(&self) -> u128 {
        self.certificates.len() as u128
    }

    pub fn exists(&self, value: impl Into<NftNum>) -> bool {
        self.lookup(value).is_ok()
    }

    pub fn owner_of(&self, value: impl Into<NftNum>) -> Result<Principal> {
        self.lookup(value).map(|cert| cert.owner)
    }

    pub fn balance_of(&self, owner: &Principal) -> u64 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    /// The full certificate record.
    pub fn data(&self, value: impl Into<NftNum>) -> Result<&Certificate> {
        self.lookup(value)
    }

    pub fn description(&self, value: impl Into<NftNum>) -> Result<&str> {
        self.lookup(value).map(|cert| cert.description.as_str())
    }

    /// Identifiers owned by `owner`, in mint order.
    pub fn tokens_of(&self, owner: &Principal) -> Vec<TokenId> {
        self.certificates
            .iter()
            .filter(|cert| &cert.owner == owner)
            .map(|cert| cert.id)
            .collect()
    }

    /// Render a certificate's URI through the configured generator.
    pub fn token_uri(
        &self,
        value: impl Into<NftNum>,
        generator: &dyn TokenUriGenerator,
    ) -> Result<String> {
        let configured = self
            .token_uri_generator
            .ok_or(ContractError::Uninitialized("token uri generator"))?;
        if generator.principal() != configured {
            return Err(ContractError::Uninitialized("token uri generator"));
        }
        let id = self.lookup(value)?.id;
        generator.render(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uri::BaseUrlGenerator;
    use proptest::prelude::*;
    use tproof_core::ErrorKind;

    const SCOPE: u64 = 1337;

    fn principal(b: u8) -> Principal {
        Principal::from_bytes([b; 32])
    }

    fn admin() -> Principal {
        principal(1)
    }

    fn minter() -> Principal {
        principal(2)
    }

    fn ctx(caller: Principal) -> CallContext {
        CallContext::new(caller, 1_700_000_000)
    }

    fn hashes(n: usize) -> Vec<ContentHash> {
        (0..n).map(|i| ContentHash::digest(&i.to_le_bytes())).collect()
    }

    fn titles(n: usize) -> Vec<String> {
        vec![String::new(); n]
    }

    fn ledger() -> TokenLedger {
        let config = LedgerConfig {
            chain_scope: SCOPE,
            ..Default::default()
        };
        let mut ledger = TokenLedger::new(Principal::derive("ledger", "test"), admin(), config).unwrap();
        ledger.grant_role(&ctx(admin()), MINT_ROLE, minter()).unwrap();
        ledger
    }

    #[test]
    fn test_rejects_chain_scope_zero() {
        let config = LedgerConfig {
            chain_scope: 0,
            ..Default::default()
        };
        assert!(TokenLedger::new(principal(9), admin(), config).is_err());
    }

    #[test]
    fn test_mint_requires_mint_role() {
        let mut ledger = ledger();
        let user = principal(3);

        let err = ledger.mint(&ctx(user), user, &hashes(1), &titles(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
        assert_eq!(ledger.total_supply(), 0);
    }

    #[test]
    fn test_mint_assigns_consecutive_ids() {
        let mut ledger = ledger();
        let user = principal(3);

        let first = ledger.mint(&ctx(minter()), user, &hashes(1), &titles(1)).unwrap();
        let next = ledger.mint(&ctx(minter()), user, &hashes(2), &titles(2)).unwrap();

        assert_eq!(first, vec![TokenId::encode(0, SCOPE).unwrap()]);
        assert_eq!(
            next,
            vec![TokenId::encode(1, SCOPE).unwrap(), TokenId::encode(2, SCOPE).unwrap()]
        );
        assert_eq!(ledger.total_supply(), 3);
        assert_eq!(ledger.balance_of(&user), 3);
        assert_eq!(ledger.tokens_of(&user).len(), 3);
    }

    #[test]
    fn test_mint_records_title_and_hash() {
        let mut ledger = ledger();
        let user = principal(3);
        let hash = ContentHash::digest(b"document");

        let ids = ledger
            .mint(&ctx(minter()), user, &[hash], &["custom title".to_string()])
            .unwrap();

        let data = ledger.data(ids[0]).unwrap();
        assert_eq!(data.title, "custom title");
        assert_eq!(data.hash, hash);
        assert_eq!(data.owner, user);
        assert_eq!(data.nft_number, 0);
        assert!(ledger.exists(ids[0]));
        assert!(ledger.exists(0u64));
    }

    #[test]
    fn test_mint_arity_mismatch() {
        let mut ledger = ledger();
        let user = principal(3);

        let err = ledger.mint(&ctx(minter()), user, &hashes(2), &titles(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArityMismatch);
        let err = ledger.mint(&ctx(minter()), user, &hashes(1), &titles(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArityMismatch);
        assert_eq!(ledger.total_supply(), 0);
    }

    #[test]
    fn test_mint_blocked_while_paused() {
        let mut ledger = ledger();
        let user = principal(3);

        ledger.pause(&ctx(admin())).unwrap();
        let err = ledger.mint(&ctx(minter()), user, &hashes(1), &titles(1)).unwrap_err();
        assert_eq!(err, ContractError::Paused);

        ledger.unpause(&ctx(admin())).unwrap();
        ledger.mint(&ctx(minter()), user, &hashes(1), &titles(1)).unwrap();
    }

    #[test]
    fn test_update_title_owner_only() {
        let mut ledger = ledger();
        let owner = principal(3);
        let other = principal(4);
        let ids = ledger.mint(&ctx(minter()), owner, &hashes(1), &titles(1)).unwrap();

        let err = ledger
            .update_title(&ctx(other), &[ids[0].into()], &["ups".into()])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOwner);

        ledger
            .update_title(&ctx(owner), &[ids[0].into()], &["newTitle".into()])
            .unwrap();
        assert_eq!(ledger.data(ids[0]).unwrap().title, "newTitle");
    }

    #[test]
    fn test_update_title_batch_is_all_or_nothing() {
        let mut ledger = ledger();
        let user1 = principal(3);
        let user2 = principal(4);
        let a = ledger.mint(&ctx(minter()), user1, &hashes(1), &titles(1)).unwrap()[0];
        let b = ledger.mint(&ctx(minter()), user2, &hashes(1), &titles(1)).unwrap()[0];

        let err = ledger
            .update_title(&ctx(user2), &[b.into(), a.into()], &["ups".into(), "ups".into()])
            .unwrap_err();
        assert!(matches!(err, ContractError::NotOwner { token_id, .. } if token_id == a));
        assert_eq!(ledger.data(b).unwrap().title, "");
    }

    #[test]
    fn test_set_description_accepts_raw_numbers() {
        let mut ledger = ledger();
        let owner = principal(3);
        ledger.mint(&ctx(minter()), owner, &hashes(2), &titles(2)).unwrap();

        ledger
            .set_description(
                &ctx(owner),
                &[NftNum::Raw(1), NftNum::Raw(0)],
                &["newDesc01".into(), "newDesc02".into()],
            )
            .unwrap();
        assert_eq!(ledger.description(1u64).unwrap(), "newDesc01");
        assert_eq!(ledger.description(0u64).unwrap(), "newDesc02");
    }

    #[test]
    fn test_set_description_errors() {
        let mut ledger = ledger();
        let owner = principal(3);
        ledger.mint(&ctx(minter()), owner, &hashes(1), &titles(1)).unwrap();

        let err = ledger
            .set_description(&ctx(owner), &[NftNum::Raw(0)], &["a".into(), "b".into()])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArityMismatch);

        let err = ledger
            .set_description(&ctx(owner), &[NftNum::Raw(5)], &["a".into()])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        ledger.pause(&ctx(admin())).unwrap();
        let err = ledger
            .set_description(&ctx(owner), &[NftNum::Raw(0)], &["a".into()])
            .unwrap_err();
        assert_eq!(err, ContractError::Paused);
    }

    #[test]
    fn test_foreign_scope_ids_are_not_found() {
        let mut ledger = ledger();
        ledger.mint(&ctx(minter()), principal(3), &hashes(1), &titles(1)).unwrap();

        let foreign = TokenId::encode(0, SCOPE + 1).unwrap();
        assert!(!ledger.exists(foreign));
        assert_eq!(ledger.normalize_nft_num(foreign).unwrap(), foreign);
    }

    #[test]
    fn test_transfer_moves_ownership_and_balances() {
        let mut ledger = ledger();
        let alice = principal(3);
        let bob = principal(4);
        let id = ledger.mint(&ctx(minter()), alice, &hashes(1), &titles(1)).unwrap()[0];

        let err = ledger.transfer(&ctx(bob), bob, id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOwner);

        ledger.transfer(&ctx(alice), bob, id).unwrap();
        assert_eq!(ledger.owner_of(id).unwrap(), bob);
        assert_eq!(ledger.balance_of(&alice), 0);
        assert_eq!(ledger.balance_of(&bob), 1);
        assert_eq!(ledger.tokens_of(&bob), vec![id]);
    }

    #[test]
    fn test_token_uri_requires_configured_generator() {
        let mut ledger = ledger();
        let id = ledger.mint(&ctx(minter()), principal(3), &hashes(1), &titles(1)).unwrap()[0];
        let generator = BaseUrlGenerator::new(principal(7), "https://tproof.io/nft");

        let err = ledger.token_uri(id, &generator).unwrap_err();
        assert_eq!(err.to_string(), "token uri generator not initialized");

        let err = ledger
            .set_token_uri_generator(&ctx(principal(3)), principal(7))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);

        ledger.set_token_uri_generator(&ctx(admin()), principal(7)).unwrap();
        assert_eq!(
            ledger.token_uri(id, &generator).unwrap(),
            format!("https://tproof.io/nft/{id}")
        );

        let impostor = BaseUrlGenerator::new(principal(8), "https://evil.example");
        assert_eq!(
            ledger.token_uri(id, &impostor).unwrap_err().kind(),
            ErrorKind::Uninitialized
        );
        assert_eq!(
            ledger.token_uri(NftNum::Raw(9), &generator).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut ledger = ledger();
        ledger.mint(&ctx(minter()), principal(3), &hashes(3), &titles(3)).unwrap();

        let mut buf = Vec::new();
        ciborium::into_writer(&ledger, &mut buf).unwrap();
        let restored: TokenLedger = ciborium::from_reader(&buf[..]).unwrap();
        assert_eq!(restored, ledger);
    }

    proptest! {
        #[test]
        fn prop_minting_n_raises_balance_by_n(batches in proptest::collection::vec(0usize..5, 1..6)) {
            let mut ledger = ledger();
            let owner = principal(3);
            let mut expected = 0u64;

            for n in batches {
                let ids = ledger.mint(&ctx(minter()), owner, &hashes(n), &titles(n)).unwrap();
                prop_assert_eq!(ids.len(), n);
                expected += n as u64;
                prop_assert_eq!(ledger.balance_of(&owner), expected);
            }
            prop_assert_eq!(ledger.total_supply(), expected as u128);
        }

        #[test]
        fn prop_unowned_member_rejects_whole_batch(n in 1usize..6, foreign in 0usize..6) {
            let foreign = foreign % n;
            let mut ledger = ledger();
            let owner = principal(3);
            let other = principal(4);

            let mut ids = Vec::new();
            for i in 0..n {
                let to = if i == foreign { other } else { owner };
                ids.push(ledger.mint(&ctx(minter()), to, &hashes(1), &titles(1)).unwrap()[0]);
            }

            let nums: Vec<NftNum> = ids.iter().map(|&id| id.into()).collect();
            let new_titles = vec!["changed".to_string(); n];
            let before = ledger.clone();
            prop_assert!(ledger.update_title(&ctx(owner), &nums, &new_titles).is_err());
            prop_assert_eq!(ledger, before);
        }
    }
}
