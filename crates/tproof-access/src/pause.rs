//! Circuit breaker.

use serde::{Deserialize, Serialize};
use tracing::info;

use tproof_core::{ContractError, Principal, Result};

use crate::roles::{AccessControl, PAUSER_ROLE};

/// A component's pause flag. Starts unpaused and never clears on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseState {
    paused: bool,
}

impl PauseState {
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Fail with [`ContractError::Paused`] while paused.
    pub fn require_not_paused(&self) -> Result<()> {
        if self.paused {
            Err(ContractError::Paused)
        } else {
            Ok(())
        }
    }

    /// Pause. The caller must hold [`PAUSER_ROLE`] in `access`.
    pub fn pause(&mut self, access: &AccessControl, caller: &Principal) -> Result<()> {
        access.check_role(PAUSER_ROLE, caller)?;
        if self.paused {
            return Err(ContractError::InvalidState("already paused".into()));
        }
        self.paused = true;
        info!(by = %caller, "paused");
        Ok(())
    }

    /// Unpause. The caller must hold [`PAUSER_ROLE`] in `access`.
    pub fn unpause(&mut self, access: &AccessControl, caller: &Principal) -> Result<()> {
        access.check_role(PAUSER_ROLE, caller)?;
        if !self.paused {
            return Err(ContractError::InvalidState("not paused".into()));
        }
        self.paused = false;
        info!(by = %caller, "unpaused");
        Ok(())
    }
}
