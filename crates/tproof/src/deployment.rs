//! Genesis wiring of a fresh system.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use tproof_access::{ALIAS_EDITOR_ROLE, CERTIFICATION_MANAGER_ROLE, MINT_ROLE, WITHDRAW_ROLE};
use tproof_core::{CallContext, Principal};
use tproof_ledger::{BaseUrlGenerator, CollectionAliases, TokenLedger};
use tproof_oracle::UrlVerifierRouter;
use tproof_registry::HashRegistry;
use tproof_router::Router;
use tproof_store::Store;

use crate::chain::Chain;
use crate::clock::Clock;
use crate::config::TProofConfig;
use crate::error::Result;
use crate::state::{Accounts, ChainState};

/// Where each component lives.
///
/// Derived from the collection symbol and chain scope, so the same
/// configuration always deploys to the same addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addresses {
    pub ledger: Principal,
    pub registry: Principal,
    pub router: Principal,
    pub url_verifier: Principal,
    pub uri_generator: Principal,
}

impl Addresses {
    pub fn derive(config: &TProofConfig) -> Self {
        let name = format!("{}@{}", config.ledger.symbol, config.ledger.chain_scope);
        Self {
            ledger: Principal::derive("tproof-ledger", &name),
            registry: Principal::derive("tproof-registry", &name),
            router: Principal::derive("tproof-router", &name),
            url_verifier: Principal::derive("tproof-url-verifier", &name),
            uri_generator: Principal::derive("tproof-uri-generator", &name),
        }
    }
}

/// A freshly wired system, before it is handed to a [`Chain`].
#[derive(Debug, Clone)]
pub struct Deployment {
    pub addresses: Addresses,
    pub state: ChainState,
    pub uri_generator: BaseUrlGenerator,
}

impl Deployment {
    /// Build and connect every component.
    ///
    /// All calls are made by `config.admin` at `config.genesis_time`:
    /// 1. ledger, registry and router are created, the router pointing at
    ///    the other two;
    /// 2. the router gets the mint role on the ledger and the certification
    ///    manager role on the registry;
    /// 3. the url-verifier router is installed on the registry;
    /// 4. configured storage types are registered;
    /// 5. the withdraw wallet, token URI generator and collection alias are
    ///    set when configured.
    pub fn deploy(config: &TProofConfig) -> Result<Self> {
        config.validate()?;
        let addresses = Addresses::derive(config);
        let admin = config.admin;
        let ctx = CallContext::new(admin, config.genesis_time);

        let mut ledger = TokenLedger::new(addresses.ledger, admin, config.ledger.clone())?;
        let mut registry = HashRegistry::new(addresses.registry, admin);
        let mut router = Router::new(
            addresses.router,
            admin,
            config.pricing,
            Some(addresses.ledger),
            Some(addresses.registry),
        );

        ledger.grant_role(&ctx, MINT_ROLE, addresses.router)?;
        registry.grant_role(&ctx, CERTIFICATION_MANAGER_ROLE, addresses.router)?;

        let url_verifier = UrlVerifierRouter::new(addresses.url_verifier, config.oracle.clone());
        registry.set_url_verifier_router(&ctx, addresses.url_verifier)?;

        for storage in &config.storage_types {
            registry.register_storage_type(&ctx, &storage.name, storage.handler)?;
        }

        if let Some(wallet) = config.withdraw_wallet {
            router.grant_role(&ctx, WITHDRAW_ROLE, wallet)?;
        }

        let uri_generator = BaseUrlGenerator::new(addresses.uri_generator, &config.token_uri_base);
        ledger.set_token_uri_generator(&ctx, addresses.uri_generator)?;

        let mut aliases = CollectionAliases::new(admin);
        aliases.grant_role(&ctx, ALIAS_EDITOR_ROLE, admin)?;
        if let Some(alias) = &config.collection_alias {
            aliases.set_alias(&ctx, addresses.ledger, alias)?;
        }

        info!(
            ledger = %addresses.ledger,
            registry = %addresses.registry,
            router = %addresses.router,
            chain_scope = config.ledger.chain_scope,
            "system deployed"
        );

        Ok(Self {
            addresses,
            state: ChainState {
                height: 0,
                accounts: Accounts::default(),
                ledger,
                registry,
                router,
                url_verifier,
                aliases,
            },
            uri_generator,
        })
    }

    /// Start a chain on this deployment, persisting to `store`.
    pub fn into_chain<S: Store>(self, store: Arc<S>, clock: Clock) -> Chain<S> {
        Chain::from_parts(self.state, self.uri_generator, store, clock)
    }
}
