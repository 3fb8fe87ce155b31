//! # tProof Access
//!
//! Role-based access control and the pause circuit breaker every tProof
//! component embeds.
//!
//! ## Overview
//!
//! Authorization is an explicit capability table: each role names a set of
//! principals and an admin role whose holders may grant and revoke it.
//! Checks are pure predicates run at the top of each operation, before any
//! state is touched. Deny by default.
//!
//! ```rust
//! use tproof_access::{AccessControl, PauseState, MINT_ROLE, PAUSER_ROLE};
//! use tproof_core::Principal;
//!
//! let admin = Principal::from_bytes([1; 32]);
//! let router = Principal::from_bytes([2; 32]);
//!
//! let mut access = AccessControl::new(admin);
//! access.grant_role(&admin, MINT_ROLE, router).unwrap();
//! assert!(access.has_role(MINT_ROLE, &router));
//!
//! let mut paused = PauseState::default();
//! access.grant_role(&admin, PAUSER_ROLE, admin).unwrap();
//! paused.pause(&access, &admin).unwrap();
//! assert!(paused.require_not_paused().is_err());
//! ```

pub mod pause;
pub mod roles;

pub use pause::PauseState;
pub use roles::{
    AccessControl, ALIAS_EDITOR_ROLE, CERTIFICATION_MANAGER_ROLE, DEFAULT_ADMIN_ROLE,
    LEDGER_ADMIN_ROLE, MINT_ROLE, PAUSER_ROLE, PRICING_ADMIN_ROLE, STORAGE_ADMIN_ROLE,
    URL_VERIFIER_ROUTER_ROLE, WITHDRAW_ROLE,
};
pub use tproof_core::{ContractError, Result};
