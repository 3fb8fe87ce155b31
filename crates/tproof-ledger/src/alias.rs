//! Human-readable aliases for certificate collections.
//!
//! Private collections are separate ledger instances; the alias book maps
//! each collection principal to a unique display name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use tproof_access::{AccessControl, ALIAS_EDITOR_ROLE};
use tproof_core::{CallContext, ContractError, Principal, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionAliases {
    aliases: BTreeMap<Principal, String>,
    access: AccessControl,
}

impl CollectionAliases {
    /// `admin` administers the alias editor role.
    pub fn new(admin: Principal) -> Self {
        Self {
            aliases: BTreeMap::new(),
            access: AccessControl::new(admin),
        }
    }

    /// Set the alias of `collection`. Returns the alias it replaced.
    pub fn set_alias(
        &mut self,
        ctx: &CallContext,
        collection: Principal,
        alias: &str,
    ) -> Result<Option<String>> {
        self.access.check_role(ALIAS_EDITOR_ROLE, &ctx.caller)?;
        let alias = alias.trim();
        if alias.is_empty() {
            return Err(ContractError::InvalidState("alias must not be empty".into()));
        }
        if let Some(holder) = self.collection_for(alias) {
            if holder != collection {
                return Err(ContractError::InvalidState(format!(
                    "alias {alias:?} already used by {holder}"
                )));
            }
        }

        debug!(collection = %collection, alias, "alias set");
        Ok(self.aliases.insert(collection, alias.to_owned()))
    }

    /// Remove the alias of `collection`, if any.
    pub fn remove_alias(&mut self, ctx: &CallContext, collection: &Principal) -> Result<Option<String>> {
        self.access.check_role(ALIAS_EDITOR_ROLE, &ctx.caller)?;
        Ok(self.aliases.remove(collection))
    }

    pub fn alias_of(&self, collection: &Principal) -> Option<&str> {
        self.aliases.get(collection).map(String::as_str)
    }

    pub fn collection_for(&self, alias: &str) -> Option<Principal> {
        self.aliases
            .iter()
            .find(|(_, a)| a.as_str() == alias)
            .map(|(collection, _)| *collection)
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

    pub fn access(&self) -> &AccessControl {
        &self.access
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tproof_core::ErrorKind;

    fn setup() -> (CollectionAliases, CallContext) {
        let admin = Principal::from_bytes([1; 32]);
        let ctx = CallContext::new(admin, 0);
        let mut book = CollectionAliases::new(admin);
        book.grant_role(&ctx, ALIAS_EDITOR_ROLE, admin).unwrap();
        (book, ctx)
    }

    #[test]
    fn test_set_and_lookup() {
        let (mut book, ctx) = setup();
        let collection = Principal::derive("ledger", "acme");

        assert_eq!(book.set_alias(&ctx, collection, "Acme Corp").unwrap(), None);
        assert_eq!(book.alias_of(&collection), Some("Acme Corp"));
        assert_eq!(book.collection_for("Acme Corp"), Some(collection));

        let old = book.set_alias(&ctx, collection, "Acme").unwrap();
        assert_eq!(old.as_deref(), Some("Acme Corp"));
        assert_eq!(book.collection_for("Acme Corp"), None);
    }

    #[test]
    fn test_alias_requires_editor_role() {
        let (mut book, _) = setup();
        let outsider = CallContext::new(Principal::from_bytes([2; 32]), 0);
        let err = book
            .set_alias(&outsider, Principal::derive("ledger", "x"), "x")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
    }

    #[test]
    fn test_aliases_are_unique() {
        let (mut book, ctx) = setup();
        let a = Principal::derive("ledger", "a");
        let b = Principal::derive("ledger", "b");

        book.set_alias(&ctx, a, "shared").unwrap();
        let err = book.set_alias(&ctx, b, "shared").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        book.remove_alias(&ctx, &a).unwrap();
        book.set_alias(&ctx, b, "shared").unwrap();
        assert_eq!(book.collection_for("shared"), Some(b));
    }
}
