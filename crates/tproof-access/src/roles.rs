//! Role table.
//!
//! Each role maps to its members and an admin role. Membership changes only
//! through [`AccessControl::grant_role`] / [`AccessControl::revoke_role`] by
//! a holder of the admin role, or [`AccessControl::renounce_role`] by the
//! member itself.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use tproof_core::{ContractError, Principal, Result};

/// Administers every role that has no explicit admin.
pub const DEFAULT_ADMIN_ROLE: &str = "DEFAULT_ADMIN_ROLE";
/// Mint certificates in a ledger.
pub const MINT_ROLE: &str = "MINT_ROLE";
/// Pause and unpause a component.
pub const PAUSER_ROLE: &str = "PAUSER_ROLE";
/// Configure a ledger (token URI generator).
pub const LEDGER_ADMIN_ROLE: &str = "LEDGER_ADMIN_ROLE";
/// Register storage types in the hash registry.
pub const STORAGE_ADMIN_ROLE: &str = "STORAGE_ADMIN_ROLE";
/// Record certifications and open or extend verifications.
pub const CERTIFICATION_MANAGER_ROLE: &str = "CERTIFICATION_MANAGER_ROLE";
/// Resolve pending verifications.
pub const URL_VERIFIER_ROUTER_ROLE: &str = "URL_VERIFIER_ROUTER_ROLE";
/// Change router prices, validity window and service toggle.
pub const PRICING_ADMIN_ROLE: &str = "PRICING_ADMIN_ROLE";
/// Withdraw the router balance.
pub const WITHDRAW_ROLE: &str = "WITHDRAW_ROLE";
/// Edit collection aliases.
pub const ALIAS_EDITOR_ROLE: &str = "ALIAS_EDITOR_ROLE";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct RoleData {
    members: BTreeSet<Principal>,
    admin: Option<String>,
}

/// The role table of one component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    roles: BTreeMap<String, RoleData>,
}

impl AccessControl {
    /// Create a table where `admin` holds [`DEFAULT_ADMIN_ROLE`].
    pub fn new(admin: Principal) -> Self {
        let mut access = Self::default();
        access.setup_role(DEFAULT_ADMIN_ROLE, admin);
        access
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn has_role(&self, role: &str, account: &Principal) -> bool {
        self.roles
            .get(role)
            .map(|data| data.members.contains(account))
            .unwrap_or(false)
    }

    /// Fail with [`ContractError::AccessDenied`] unless `account` holds `role`.
    pub fn check_role(&self, role: &str, account: &Principal) -> Result<()> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(ContractError::AccessDenied {
                account: *account,
                role: role.to_owned(),
            })
        }
    }

    /// The role whose holders administer `role`.
    pub fn role_admin(&self, role: &str) -> &str {
        self.roles
            .get(role)
            .and_then(|data| data.admin.as_deref())
            .unwrap_or(DEFAULT_ADMIN_ROLE)
    }

    /// Current members of `role`, in ascending order.
    pub fn members(&self, role: &str) -> Vec<Principal> {
        self.roles
            .get(role)
            .map(|data| data.members.iter().copied().collect())
            .unwrap_or_default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Administration
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant `role` to `account`. Returns whether membership changed.
    pub fn grant_role(&mut self, caller: &Principal, role: &str, account: Principal) -> Result<bool> {
        self.check_role(&self.role_admin(role).to_owned(), caller)?;
        Ok(self.setup_role(role, account))
    }

    /// Revoke `role` from `account`. Returns whether membership changed.
    pub fn revoke_role(&mut self, caller: &Principal, role: &str, account: &Principal) -> Result<bool> {
        self.check_role(&self.role_admin(role).to_owned(), caller)?;
        Ok(self.remove_role(role, account))
    }

    /// Drop the caller's own membership of `role`.
    pub fn renounce_role(&mut self, caller: &Principal, role: &str) -> bool {
        self.remove_role(role, caller)
    }

    /// Make `admin_role` the admin of `role`.
    ///
    /// Unchecked: components call this while being constructed.
    pub fn set_role_admin(&mut self, role: &str, admin_role: &str) {
        debug!(role, admin_role, "set role admin");
        self.roles.entry(role.to_owned()).or_default().admin = Some(admin_role.to_owned());
    }

    /// Grant without an admin check.
    ///
    /// For construction and for components that hand a role to a
    /// principal they were explicitly configured with.
    pub fn setup_role(&mut self, role: &str, account: Principal) -> bool {
        let added = self
            .roles
            .entry(role.to_owned())
            .or_default()
            .members
            .insert(account);
        if added {
            debug!(role, account = %account, "role granted");
        }
        added
    }

    /// Revoke without an admin check.
    pub fn remove_role(&mut self, role: &str, account: &Principal) -> bool {
        let removed = self
            .roles
            .get_mut(role)
            .map(|data| data.members.remove(account))
            .unwrap_or(false);
        if removed {
            debug!(role, account = %account, "role revoked");
        }
        removed
    }
}
