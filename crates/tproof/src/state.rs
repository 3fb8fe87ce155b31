//! Everything a chain owns, and its per-component snapshot encoding.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use tproof_core::{Amount, ContractError, Principal};
use tproof_ledger::{CollectionAliases, TokenLedger};
use tproof_oracle::UrlVerifierRouter;
use tproof_registry::HashRegistry;
use tproof_router::Router;

use crate::error::{Result, TProofError};

/// Snapshot names, one per component.
pub mod components {
    pub const ACCOUNTS: &str = "accounts";
    pub const LEDGER: &str = "ledger";
    pub const REGISTRY: &str = "registry";
    pub const ROUTER: &str = "router";
    pub const URL_VERIFIER: &str = "url_verifier";
    pub const ALIASES: &str = "aliases";

    pub const ALL: [&str; 6] = [ACCOUNTS, LEDGER, REGISTRY, ROUTER, URL_VERIFIER, ALIASES];
}

/// Native-currency balances held outside the components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accounts {
    balances: BTreeMap<Principal, Amount>,
}

impl Accounts {
    pub fn balance_of(&self, account: &Principal) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn credit(&mut self, account: Principal, amount: Amount) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let balance = self.balance_of(&account);
        let updated = balance
            .checked_add(amount)
            .ok_or_else(|| ContractError::InvalidState(format!("balance overflow for {account}")))?;
        self.balances.insert(account, updated);
        Ok(())
    }

    pub fn debit(&mut self, account: Principal, amount: Amount) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let balance = self.balance_of(&account);
        if balance < amount {
            return Err(TProofError::InsufficientFunds {
                account,
                balance,
                required: amount,
            });
        }
        if balance == amount {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, balance - amount);
        }
        Ok(())
    }

    /// Sum of all account balances.
    pub fn total(&self) -> Amount {
        self.balances.values().fold(0, |acc, b| acc.saturating_add(*b))
    }
}

/// The complete state behind a chain. Cloned for every transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainState {
    pub height: u64,
    pub accounts: Accounts,
    pub ledger: TokenLedger,
    pub registry: HashRegistry,
    pub router: Router,
    pub url_verifier: UrlVerifierRouter,
    pub aliases: CollectionAliases,
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes)
        .map_err(|e| TProofError::Serialization(e.to_string()))?;
    Ok(bytes)
}

fn decode<T: DeserializeOwned>(component: &str, bytes: &[u8]) -> Result<T> {
    ciborium::from_reader(bytes)
        .map_err(|e| TProofError::Serialization(format!("{component}: {e}")))
}

impl ChainState {
    /// Encode every component as CBOR, keyed by its snapshot name.
    pub fn encode_components(&self) -> Result<Vec<(&'static str, Vec<u8>)>> {
        Ok(vec![
            (components::ACCOUNTS, encode(&self.accounts)?),
            (components::LEDGER, encode(&self.ledger)?),
            (components::REGISTRY, encode(&self.registry)?),
            (components::ROUTER, encode(&self.router)?),
            (components::URL_VERIFIER, encode(&self.url_verifier)?),
            (components::ALIASES, encode(&self.aliases)?),
        ])
    }

    /// Rebuild a state from component snapshots taken at `height`.
    pub fn decode_components(height: u64, snapshots: &BTreeMap<String, Vec<u8>>) -> Result<Self> {
        let get = |name: &str| {
            snapshots
                .get(name)
                .map(Vec::as_slice)
                .ok_or_else(|| TProofError::Serialization(format!("missing snapshot {name}")))
        };

        Ok(Self {
            height,
            accounts: decode(components::ACCOUNTS, get(components::ACCOUNTS)?)?,
            ledger: decode(components::LEDGER, get(components::LEDGER)?)?,
            registry: decode(components::REGISTRY, get(components::REGISTRY)?)?,
            router: decode(components::ROUTER, get(components::ROUTER)?)?,
            url_verifier: decode(components::URL_VERIFIER, get(components::URL_VERIFIER)?)?,
            aliases: decode(components::ALIASES, get(components::ALIASES)?)?,
        })
    }
}
