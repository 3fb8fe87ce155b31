//! The Chain: single-writer host for the deployed components.
//!
//! Every entry point is a transaction. The state is cloned, the call runs
//! against the clone, and only a successful call replaces the live state.
//! A failure anywhere inside a call, including one the components did not
//! anticipate, leaves nothing behind.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use tproof_core::{
    Amount, CallContext, ContentHash, ContractError, NftNum, Principal, Timestamp, TokenId,
};
use tproof_ledger::{BaseUrlGenerator, CollectionAliases, TokenLedger, TokenUriGenerator};
use tproof_oracle::{OracleError, OracleMessage, OracleTransport, RequestId, UrlVerifierRouter};
use tproof_registry::{HashRegistry, VerificationOutcome, VerificationStatus};
use tproof_router::{ProofsCreated, Router};
use tproof_store::{InsertResult, JournalEntry, Store, StoreError, StoreExt};

use crate::clock::Clock;
use crate::config::TProofConfig;
use crate::deployment::{Addresses, Deployment};
use crate::error::{Result, TProofError};
use crate::state::{components, ChainState};

/// A component with its own role table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Component {
    Ledger,
    Registry,
    Router,
    Aliases,
}

/// Hosts one deployment: components, balances, clock and persistence.
pub struct Chain<S: Store> {
    state: ChainState,
    uri_generator: BaseUrlGenerator,
    store: Arc<S>,
    clock: Clock,
    /// Committed but not yet written to the store.
    unpersisted: Vec<JournalEntry>,
}

impl<S: Store> Chain<S> {
    /// Deploy a fresh system from `config` onto `store`.
    pub fn deploy(config: &TProofConfig, store: S, clock: Clock) -> Result<Self> {
        Ok(Deployment::deploy(config)?.into_chain(Arc::new(store), clock))
    }

    pub(crate) fn from_parts(
        state: ChainState,
        uri_generator: BaseUrlGenerator,
        store: Arc<S>,
        clock: Clock,
    ) -> Self {
        Self {
            state,
            uri_generator,
            store,
            clock,
            unpersisted: Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────────────────────

    /// Run `call` as one transaction by `caller` with `value` attached.
    ///
    /// The value is debited from the caller's account before any component
    /// runs.
    fn transact<T, E>(
        &mut self,
        entry_point: &'static str,
        caller: Principal,
        value: Amount,
        call: impl FnOnce(&mut ChainState, &CallContext) -> std::result::Result<T, E>,
    ) -> Result<T>
    where
        E: Into<TProofError>,
    {
        let ctx = CallContext::new(caller, self.clock.now()).with_value(value);
        let mut next = self.state.clone();

        let outcome = match next.accounts.debit(caller, value) {
            Ok(()) => call(&mut next, &ctx).map_err(Into::into),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(out) => {
                self.commit(next, entry_point, &ctx);
                Ok(out)
            }
            Err(e) => {
                warn!(entry_point, caller = %caller, value, error = %e, "transaction reverted");
                Err(e)
            }
        }
    }

    fn commit(&mut self, mut next: ChainState, entry_point: &'static str, ctx: &CallContext) {
        next.height += 1;
        let entry = JournalEntry {
            height: next.height,
            entry_point: entry_point.to_owned(),
            caller: ctx.caller,
            value: ctx.value,
            at: ctx.now,
        };
        debug!(height = entry.height, entry_point, caller = %ctx.caller, "transaction committed");
        self.state = next;
        self.unpersisted.push(entry);
    }

    /// Credit native currency to `account`.
    pub fn fund(&mut self, account: Principal, amount: Amount) -> Result<()> {
        self.transact("fund", account, 0, |s, _| s.accounts.credit(account, amount))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Router
    // ─────────────────────────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    pub fn create_proofs(
        &mut self,
        caller: Principal,
        value: Amount,
        hashes: &[ContentHash],
        titles: &[String],
        with_verification: &[bool],
        storage_types: &[String],
        cert_owner: Principal,
        cert_payer: Principal,
    ) -> Result<ProofsCreated> {
        self.transact("create_proofs", caller, value, |s, ctx| {
            s.router.create_proofs(
                ctx,
                &mut s.ledger,
                &mut s.registry,
                hashes,
                titles,
                with_verification,
                storage_types,
                cert_owner,
                cert_payer,
            )
        })
    }

    pub fn edit_proof_title(
        &mut self,
        caller: Principal,
        ids: &[NftNum],
        titles: &[String],
    ) -> Result<()> {
        self.transact("edit_proof_title", caller, 0, |s, ctx| {
            s.router.edit_proof_title(ctx, &mut s.ledger, ids, titles)
        })
    }

    pub fn verify_hash_file_url(
        &mut self,
        caller: Principal,
        ids: &[NftNum],
        urls: &[String],
        storage_types: &[String],
        validity_secs: &[u64],
    ) -> Result<Vec<ContentHash>> {
        self.transact("verify_hash_file_url", caller, 0, |s, ctx| {
            s.router.verify_hash_file_url(
                ctx,
                &s.ledger,
                &mut s.registry,
                ids,
                urls,
                storage_types,
                validity_secs,
            )
        })
    }

    pub fn extend_verification(
        &mut self,
        caller: Principal,
        value: Amount,
        ids: &[NftNum],
        validity_secs: &[u64],
    ) -> Result<Vec<ContentHash>> {
        self.transact("extend_verification", caller, value, |s, ctx| {
            s.router
                .extend_verification(ctx, &s.ledger, &mut s.registry, ids, validity_secs)
        })
    }

    /// Send value to the router without buying anything.
    pub fn receive(&mut self, caller: Principal, value: Amount) -> Result<Amount> {
        self.transact("receive", caller, value, |s, ctx| s.router.receive(ctx))
    }

    /// Move the router's whole balance to the caller's account.
    pub fn withdraw(&mut self, caller: Principal) -> Result<Amount> {
        self.transact("withdraw", caller, 0, |s, ctx| {
            let amount = s.router.withdraw(ctx)?;
            s.accounts.credit(ctx.caller, amount)?;
            Ok::<_, TProofError>(amount)
        })
    }

    pub fn set_mint_price(&mut self, caller: Principal, price: Amount) -> Result<()> {
        self.transact("set_mint_price", caller, 0, |s, ctx| s.router.set_mint_price(ctx, price))
    }

    pub fn set_verification_price(&mut self, caller: Principal, price: Amount) -> Result<()> {
        self.transact("set_verification_price", caller, 0, |s, ctx| {
            s.router.set_verification_price(ctx, price)
        })
    }

    pub fn set_validity_window(&mut self, caller: Principal, secs: u64) -> Result<()> {
        self.transact("set_validity_window", caller, 0, |s, ctx| {
            s.router.set_validity_window(ctx, secs)
        })
    }

    /// Flip the verification service switch. Returns the new setting.
    pub fn toggle_url_verification_service(&mut self, caller: Principal) -> Result<bool> {
        self.transact("toggle_url_verification_service", caller, 0, |s, ctx| {
            s.router.toggle_url_verification_service(ctx)
        })
    }

    pub fn set_nft_factory(&mut self, caller: Principal, ledger: Principal) -> Result<Option<Principal>> {
        self.transact("set_nft_factory", caller, 0, |s, ctx| s.router.set_nft_factory(ctx, ledger))
    }

    pub fn set_hash_registry(
        &mut self,
        caller: Principal,
        registry: Principal,
    ) -> Result<Option<Principal>> {
        self.transact("set_hash_registry", caller, 0, |s, ctx| {
            s.router.set_hash_registry(ctx, registry)
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ledger
    // ─────────────────────────────────────────────────────────────────────────

    pub fn mint(
        &mut self,
        caller: Principal,
        owner: Principal,
        hashes: &[ContentHash],
        titles: &[String],
    ) -> Result<Vec<TokenId>> {
        self.transact("mint", caller, 0, |s, ctx| s.ledger.mint(ctx, owner, hashes, titles))
    }

    pub fn update_title(&mut self, caller: Principal, ids: &[NftNum], titles: &[String]) -> Result<()> {
        self.transact("update_title", caller, 0, |s, ctx| s.ledger.update_title(ctx, ids, titles))
    }

    pub fn set_description(
        &mut self,
        caller: Principal,
        ids: &[NftNum],
        descriptions: &[String],
    ) -> Result<()> {
        self.transact("set_description", caller, 0, |s, ctx| {
            s.ledger.set_description(ctx, ids, descriptions)
        })
    }

    pub fn transfer(&mut self, caller: Principal, to: Principal, id: impl Into<NftNum>) -> Result<()> {
        let id = id.into();
        self.transact("transfer", caller, 0, |s, ctx| s.ledger.transfer(ctx, to, id))
    }

    /// Install `generator` and point the ledger at it. Returns the address
    /// of the generator it replaced.
    pub fn set_token_uri_generator(
        &mut self,
        caller: Principal,
        generator: BaseUrlGenerator,
    ) -> Result<Option<Principal>> {
        let address = generator.principal();
        let previous = self.transact("set_token_uri_generator", caller, 0, |s, ctx| {
            s.ledger.set_token_uri_generator(ctx, address)
        })?;
        self.uri_generator = generator;
        Ok(previous)
    }

    /// Render a certificate's URI through the installed generator.
    pub fn token_uri(&self, id: impl Into<NftNum>) -> Result<String> {
        Ok(self.state.ledger.token_uri(id, &self.uri_generator)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Registry
    // ─────────────────────────────────────────────────────────────────────────

    pub fn register_storage_type(
        &mut self,
        caller: Principal,
        name: &str,
        handler: Principal,
    ) -> Result<Option<Principal>> {
        self.transact("register_storage_type", caller, 0, |s, ctx| {
            s.registry.register_storage_type(ctx, name, handler)
        })
    }

    pub fn set_url_verifier_router(
        &mut self,
        caller: Principal,
        router: Principal,
    ) -> Result<Option<Principal>> {
        self.transact("set_url_verifier_router", caller, 0, |s, ctx| {
            s.registry.set_url_verifier_router(ctx, router)
        })
    }

    /// Record a certification directly. Certification managers only.
    pub fn record_certification(
        &mut self,
        caller: Principal,
        hash: ContentHash,
        id: TokenId,
    ) -> Result<()> {
        self.transact("record_certification", caller, 0, |s, ctx| {
            s.registry.record_certification(ctx, hash, id)
        })
    }

    /// Open a verification directly. Certification managers only.
    pub fn open_verification(
        &mut self,
        caller: Principal,
        hash: ContentHash,
        url: &str,
        storage_type: &str,
        validity_secs: u64,
    ) -> Result<()> {
        self.transact("open_verification", caller, 0, |s, ctx| {
            s.registry
                .open_verification(ctx, hash, url, storage_type, validity_secs)
        })
    }

    /// Resolve the current opening of a verification directly.
    /// Url-verifier routers only.
    ///
    /// Requests still in flight for `hash` are retired with it.
    pub fn resolve_verification(
        &mut self,
        caller: Principal,
        hash: ContentHash,
        outcome: VerificationOutcome,
    ) -> Result<VerificationStatus> {
        self.transact("resolve_verification", caller, 0, |s, ctx| {
            let requested_at = s
                .registry
                .verification(&hash)
                .map(|v| v.requested_at)
                .unwrap_or_default();
            let status = s.registry.resolve_verification(ctx, &hash, requested_at, outcome)?;
            s.url_verifier.retire_requests_for(&hash);
            Ok::<_, ContractError>(status)
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Aliases
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_alias(
        &mut self,
        caller: Principal,
        collection: Principal,
        alias: &str,
    ) -> Result<Option<String>> {
        self.transact("set_alias", caller, 0, |s, ctx| {
            s.aliases.set_alias(ctx, collection, alias)
        })
    }

    pub fn remove_alias(&mut self, caller: Principal, collection: Principal) -> Result<Option<String>> {
        self.transact("remove_alias", caller, 0, |s, ctx| {
            s.aliases.remove_alias(ctx, &collection)
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Access Control
    // ─────────────────────────────────────────────────────────────────────────

    pub fn pause(&mut self, caller: Principal, component: Component) -> Result<()> {
        self.transact("pause", caller, 0, |s, ctx| match component {
            Component::Ledger => s.ledger.pause(ctx),
            Component::Registry => s.registry.pause(ctx),
            Component::Router => s.router.pause(ctx),
            Component::Aliases => Err(ContractError::InvalidState("aliases cannot be paused".into())),
        })
    }

    pub fn unpause(&mut self, caller: Principal, component: Component) -> Result<()> {
        self.transact("unpause", caller, 0, |s, ctx| match component {
            Component::Ledger => s.ledger.unpause(ctx),
            Component::Registry => s.registry.unpause(ctx),
            Component::Router => s.router.unpause(ctx),
            Component::Aliases => Err(ContractError::InvalidState("aliases cannot be paused".into())),
        })
    }

    /// Grant `role` on `component`. Returns whether membership changed.
    pub fn grant_role(
        &mut self,
        caller: Principal,
        component: Component,
        role: &str,
        account: Principal,
    ) -> Result<bool> {
        self.transact("grant_role", caller, 0, |s, ctx| match component {
            Component::Ledger => s.ledger.grant_role(ctx, role, account),
            Component::Registry => s.registry.grant_role(ctx, role, account),
            Component::Router => s.router.grant_role(ctx, role, account),
            Component::Aliases => s.aliases.grant_role(ctx, role, account),
        })
    }

    /// Revoke `role` on `component`. Returns whether membership changed.
    pub fn revoke_role(
        &mut self,
        caller: Principal,
        component: Component,
        role: &str,
        account: Principal,
    ) -> Result<bool> {
        self.transact("revoke_role", caller, 0, |s, ctx| match component {
            Component::Ledger => s.ledger.revoke_role(ctx, role, &account),
            Component::Registry => s.registry.revoke_role(ctx, role, &account),
            Component::Router => s.router.revoke_role(ctx, role, &account),
            Component::Aliases => s.aliases.revoke_role(ctx, role, &account),
        })
    }

    /// Drop the caller's own membership of `role` on `component`.
    pub fn renounce_role(&mut self, caller: Principal, component: Component, role: &str) -> Result<bool> {
        self.transact("renounce_role", caller, 0, |s, ctx| {
            Ok::<_, ContractError>(match component {
                Component::Ledger => s.ledger.renounce_role(ctx, role),
                Component::Registry => s.registry.renounce_role(ctx, role),
                Component::Router => s.router.renounce_role(ctx, role),
                Component::Aliases => s.aliases.renounce_role(ctx, role),
            })
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Oracle
    // ─────────────────────────────────────────────────────────────────────────

    /// Hand every queued verification request to the url-verifier router.
    ///
    /// Requests leave the registry queue only once sent. A transport failure
    /// stops the batch and keeps the rest queued for the next attempt.
    /// Requests the router cannot send at all (addressed elsewhere or over
    /// the message limits) are dropped and stay Pending until they expire.
    pub async fn dispatch_verifications<T: OracleTransport + ?Sized>(
        &mut self,
        transport: &T,
    ) -> Result<Vec<RequestId>> {
        let pending = self.state.registry.pending_requests().to_vec();
        let mut sent = Vec::new();
        let mut handled = 0;
        let mut failure = None;

        for request in pending {
            let hash = request.hash;
            match self.state.url_verifier.dispatch(request, transport).await {
                Ok(id) => sent.push(id),
                Err(e @ (OracleError::Misaddressed { .. } | OracleError::InvalidMessage(_))) => {
                    warn!(hash = %hash, error = %e, "verification request dropped");
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
            handled += 1;
        }
        self.state.registry.acknowledge_requests(handled);

        match failure {
            Some(e) => {
                warn!(sent = sent.len(), error = %e, "dispatch interrupted");
                Err(e.into())
            }
            None => {
                if !sent.is_empty() {
                    info!(count = sent.len(), "verification requests dispatched");
                }
                Ok(sent)
            }
        }
    }

    /// Apply an oracle message as a transaction by the url-verifier router.
    ///
    /// An authenticated fulfilment the registry refuses (for example one
    /// arriving after expiry) still retires its request. The retirement is
    /// committed as its own `retire_request` transaction and the registry's
    /// error is returned.
    pub fn process_oracle_message(&mut self, message: OracleMessage) -> Result<VerificationStatus> {
        let ctx = CallContext::new(self.state.url_verifier.principal(), self.clock.now());
        let mut next = self.state.clone();

        match next.url_verifier.fulfil(message, &mut next.registry, ctx.now) {
            Ok(status) => {
                self.commit(next, "fulfil", &ctx);
                Ok(status)
            }
            Err(e @ OracleError::Contract(_)) => {
                let mut retired = self.state.clone();
                retired.url_verifier = next.url_verifier;
                warn!(error = %e, "fulfilment refused by the registry; request retired");
                self.commit(retired, "retire_request", &ctx);
                Err(e.into())
            }
            Err(e) => {
                warn!(error = %e, "oracle message rejected");
                Err(e.into())
            }
        }
    }

    /// Wait for the next oracle message and apply it.
    ///
    /// Returns `None` if nothing arrived within the configured timeout.
    pub async fn await_oracle<T: OracleTransport + ?Sized>(
        &mut self,
        transport: &T,
    ) -> Result<Option<VerificationStatus>> {
        let timeout = self.state.url_verifier.config().response_timeout;
        match transport.recv_timeout(timeout).await? {
            Some((from, message)) => {
                if from != self.state.url_verifier.config().oracle_key {
                    debug!(from = %from, "message from a non-oracle sender");
                }
                self.process_oracle_message(message).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Forget in-flight requests the registry can no longer accept an
    /// answer for. Extended verifications keep theirs.
    pub fn prune_expired_requests(&mut self) -> usize {
        let now = self.clock.now();
        self.state
            .url_verifier
            .prune_expired(&self.state.registry, now)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Encode every component as it stands.
    pub fn snapshot(&self) -> Result<Vec<(&'static str, Vec<u8>)>> {
        self.state.encode_components()
    }

    /// Write the unpersisted journal and a snapshot of every component.
    ///
    /// Returns the persisted height.
    pub async fn persist(&mut self) -> Result<u64> {
        for entry in &self.unpersisted {
            if let InsertResult::Conflict { existing } = self.store.append_journal(entry).await? {
                warn!(height = existing.height, existing = %existing.entry_point, "journal conflict");
                return Err(TProofError::JournalConflict {
                    height: entry.height,
                });
            }
        }

        let snapshots = self.snapshot()?;
        let height = self.state.height;
        self.store
            .put_snapshots(height, &snapshots, self.clock.now())
            .await?;
        self.unpersisted.clear();

        info!(height, components = snapshots.len(), "state persisted");
        Ok(height)
    }

    /// Load a chain from the snapshots in `store`.
    ///
    /// The URI generator is rebuilt from `config`.
    pub async fn restore(store: Arc<S>, config: &TProofConfig, clock: Clock) -> Result<Self> {
        let mut snapshots = BTreeMap::new();
        let mut height = None;

        for name in components::ALL {
            let snapshot = store
                .get_snapshot(name)
                .await?
                .ok_or_else(|| StoreError::NotFound(name.to_owned()))?;
            match height {
                None => height = Some(snapshot.height),
                Some(h) if h != snapshot.height => {
                    return Err(StoreError::InvalidData(format!(
                        "snapshot {name} is at height {}, expected {h}",
                        snapshot.height
                    ))
                    .into());
                }
                Some(_) => {}
            }
            snapshots.insert(name.to_owned(), snapshot.bytes.to_vec());
        }

        let height = height.unwrap_or(0);
        let state = ChainState::decode_components(height, &snapshots)?;
        if let Some(head) = store.journal_head().await? {
            if head != height {
                warn!(head, height, "journal and snapshots disagree");
            }
        }

        let uri_generator = BaseUrlGenerator::new(
            Addresses::derive(config).uri_generator,
            config.token_uri_base.as_str(),
        );
        info!(height, "state restored");
        Ok(Self::from_parts(state, uri_generator, store, clock))
    }

    /// Journal entries committed since the last `persist`.
    pub fn unpersisted(&self) -> &[JournalEntry] {
        &self.unpersisted
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Time
    // ─────────────────────────────────────────────────────────────────────────

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn advance_time(&mut self, secs: u64) {
        self.clock.advance(secs);
    }

    pub fn set_time(&mut self, at: Timestamp) {
        self.clock.set(at);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn state(&self) -> &ChainState {
        &self.state
    }

    /// Number of committed transactions.
    pub fn height(&self) -> u64 {
        self.state.height
    }

    pub fn balance_of(&self, account: &Principal) -> Amount {
        self.state.accounts.balance_of(account)
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.state.ledger
    }

    pub fn registry(&self) -> &HashRegistry {
        &self.state.registry
    }

    pub fn router(&self) -> &Router {
        &self.state.router
    }

    pub fn url_verifier(&self) -> &UrlVerifierRouter {
        &self.state.url_verifier
    }

    pub fn aliases(&self) -> &CollectionAliases {
        &self.state.aliases
    }

    pub fn uri_generator(&self) -> &BaseUrlGenerator {
        &self.uri_generator
    }

    /// Status of the verification of `hash` as of now.
    pub fn verification_status(&self, hash: &ContentHash) -> Option<VerificationStatus> {
        self.state.registry.verification_status(hash, self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tproof_access::{MINT_ROLE, PAUSER_ROLE, WITHDRAW_ROLE};
    use tproof_core::ErrorKind;
    use tproof_store::MemoryStore;

    use crate::config::ARWEAVE_V1;

    const T0: Timestamp = 1_700_000_000;

    fn p(b: u8) -> Principal {
        Principal::from_bytes([b; 32])
    }

    fn chain() -> Chain<MemoryStore> {
        let mut config = TProofConfig::with_admin(p(1));
        config.pricing.mint_price = 10;
        config.pricing.verification_price = 3;
        config.withdraw_wallet = Some(p(9));
        Chain::deploy(&config, MemoryStore::new(), Clock::manual(T0)).unwrap()
    }

    fn kind(err: TProofError) -> ErrorKind {
        match err {
            TProofError::Contract(e) => e.kind(),
            other => panic!("expected a contract error, got {other}"),
        }
    }

    #[test]
    fn test_paid_create_proofs_moves_value() {
        let mut chain = chain();
        chain.fund(p(2), 100).unwrap();

        let created = chain
            .create_proofs(
                p(2),
                13,
                &[ContentHash::digest(b"doc")],
                &["doc".into()],
                &[true],
                &[ARWEAVE_V1.into()],
                p(2),
                p(2),
            )
            .unwrap();

        assert_eq!(created.token_ids.len(), 1);
        assert_eq!(chain.balance_of(&p(2)), 87);
        assert_eq!(chain.router().balance(), 13);
        assert_eq!(chain.height(), 2);
        assert_eq!(chain.registry().pending_requests().len(), 1);
    }

    #[test]
    fn test_insufficient_funds_reverts() {
        let mut chain = chain();
        chain.fund(p(2), 5).unwrap();
        let before = chain.state().clone();

        let err = chain
            .create_proofs(
                p(2),
                10,
                &[ContentHash::digest(b"doc")],
                &["doc".into()],
                &[false],
                &[ARWEAVE_V1.into()],
                p(2),
                p(2),
            )
            .unwrap_err();
        assert!(matches!(err, TProofError::InsufficientFunds { .. }));
        assert_eq!(chain.state(), &before);
        assert_eq!(chain.unpersisted().len(), 1);
    }

    #[test]
    fn test_rejected_payment_is_refunded() {
        let mut chain = chain();
        chain.fund(p(2), 100).unwrap();

        let err = chain
            .create_proofs(
                p(2),
                11,
                &[ContentHash::digest(b"doc")],
                &["doc".into()],
                &[false],
                &[ARWEAVE_V1.into()],
                p(2),
                p(2),
            )
            .unwrap_err();
        assert_eq!(kind(err), ErrorKind::IncorrectPayment);
        assert_eq!(chain.balance_of(&p(2)), 100);
        assert_eq!(chain.ledger().total_supply(), 0);
    }

    #[test]
    fn test_withdraw_credits_wallet() {
        let mut chain = chain();
        chain.fund(p(2), 50).unwrap();
        chain.receive(p(2), 50).unwrap();

        assert_eq!(kind(chain.withdraw(p(2)).unwrap_err()), ErrorKind::AccessDenied);
        assert_eq!(chain.withdraw(p(9)).unwrap(), 50);
        assert_eq!(chain.balance_of(&p(9)), 50);
        assert_eq!(chain.router().balance(), 0);
    }

    #[test]
    fn test_router_balance_overflow_reverts() {
        let mut chain = chain();
        chain.fund(p(7), Amount::MAX).unwrap();
        chain.fund(p(8), Amount::MAX).unwrap();
        assert_eq!(chain.receive(p(7), Amount::MAX).unwrap(), Amount::MAX);
        let before = chain.state().clone();

        let err = chain.receive(p(8), 1).unwrap_err();
        assert_eq!(kind(err), ErrorKind::InvalidState);
        assert_eq!(chain.state(), &before);
        assert_eq!(chain.balance_of(&p(8)), Amount::MAX);
        assert_eq!(chain.router().balance(), Amount::MAX);
    }

    #[test]
    fn test_pause_by_component() {
        let mut chain = chain();
        chain.grant_role(p(1), Component::Ledger, PAUSER_ROLE, p(3)).unwrap();
        chain.pause(p(3), Component::Ledger).unwrap();
        assert!(chain.ledger().is_paused());
        assert!(!chain.router().is_paused());

        let err = chain.pause(p(1), Component::Aliases).unwrap_err();
        assert_eq!(kind(err), ErrorKind::InvalidState);

        assert!(chain.renounce_role(p(3), Component::Ledger, PAUSER_ROLE).unwrap());
        assert_eq!(kind(chain.unpause(p(3), Component::Ledger).unwrap_err()), ErrorKind::AccessDenied);
        chain.unpause(p(1), Component::Ledger).unwrap();
        assert!(!chain.ledger().is_paused());
    }

    #[test]
    fn test_revoke_withdraw_role() {
        let mut chain = chain();
        assert!(chain.revoke_role(p(1), Component::Router, WITHDRAW_ROLE, p(9)).unwrap());
        assert_eq!(kind(chain.withdraw(p(9)).unwrap_err()), ErrorKind::AccessDenied);
    }

    #[test]
    fn test_token_uri_follows_installed_generator() {
        let mut chain = chain();
        chain
            .grant_role(p(1), Component::Ledger, MINT_ROLE, p(1))
            .unwrap();
        let id = chain
            .mint(p(1), p(2), &[ContentHash::digest(b"a")], &["a".into()])
            .unwrap()[0];
        assert!(chain.token_uri(id).unwrap().ends_with(&id.to_string()));

        let deployed = chain.uri_generator().principal();
        let generator = BaseUrlGenerator::new(Principal::derive("uri", "v2"), "https://v2.example");
        assert_eq!(chain.set_token_uri_generator(p(1), generator).unwrap(), Some(deployed));
        assert_eq!(chain.token_uri(id).unwrap(), format!("https://v2.example/{id}"));

        let outsider = BaseUrlGenerator::new(Principal::derive("uri", "v3"), "https://v3.example");
        assert_eq!(
            kind(chain.set_token_uri_generator(p(2), outsider).unwrap_err()),
            ErrorKind::AccessDenied
        );
        assert!(chain.token_uri(id).unwrap().starts_with("https://v2.example/"));
    }

    #[test]
    fn test_clock_drives_context() {
        let mut chain = chain();
        chain.advance_time(100);
        assert_eq!(chain.now(), T0 + 100);
        chain.fund(p(2), 1).unwrap();
        assert_eq!(chain.unpersisted().last().unwrap().at, T0 + 100);
    }
}
