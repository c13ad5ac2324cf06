//! Auth & Lifecycle (§2, §6 "Controller operations", I5): the operator
//! set, controller privilege, and the one-bundle-per-block lock.

use alloy_primitives::Address;

use crate::error::{AngstromError, Result};
use crate::host::SignerAuthority;

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    controller: Option<Address>,
    operators: ahash::AHashMap<Address, bool>,
    last_updated_block: Option<u64>,
    block_attested: ahash::AHashMap<u64, bool>,
}

impl AuthState {
    pub fn new(controller: Address) -> Self {
        Self {
            controller: Some(controller),
            operators: ahash::AHashMap::new(),
            last_updated_block: None,
            block_attested: ahash::AHashMap::new(),
        }
    }

    pub fn require_controller(&self, caller: Address) -> Result<()> {
        if self.controller != Some(caller) {
            return Err(AngstromError::NotController);
        }
        Ok(())
    }

    pub fn set_controller(&mut self, caller: Address, new_controller: Address) -> Result<()> {
        self.require_controller(caller)?;
        self.controller = Some(new_controller);
        Ok(())
    }

    pub fn toggle_operators(&mut self, caller: Address, addresses: &[Address]) -> Result<()> {
        self.require_controller(caller)?;
        for addr in addresses {
            let active = self.operators.entry(*addr).or_insert(false);
            *active = !*active;
        }
        Ok(())
    }

    pub fn is_active_operator(&self, addr: Address) -> bool {
        self.operators.get(&addr).copied().unwrap_or(false)
    }

    pub fn require_operator(&self, caller: Address) -> Result<()> {
        if !self.is_active_operator(caller) {
            return Err(AngstromError::NotOperator);
        }
        Ok(())
    }

    pub fn operators(&self) -> impl Iterator<Item = SignerAuthority> + '_ {
        self.operators
            .iter()
            .map(|(&address, &is_active)| SignerAuthority { address, is_active })
    }

    /// I5: acquire the per-block lock, failing if this block already
    /// executed a bundle.
    pub fn acquire_block_lock(&mut self, block: u64) -> Result<()> {
        if self.last_updated_block == Some(block) {
            return Err(AngstromError::OnlyOncePerBlock);
        }
        self.last_updated_block = Some(block);
        self.block_attested.insert(block, true);
        Ok(())
    }

    pub fn is_attested(&self, block: u64) -> bool {
        self.block_attested.get(&block).copied().unwrap_or(false)
    }

    /// Empty-block attestation path (§4.9): marks the block used without
    /// running a bundle, so the Unlock Gate will allow direct AMM swaps.
    pub fn attest_empty_block(&mut self, block: u64) -> Result<()> {
        if self.last_updated_block == Some(block) && self.is_attested(block) {
            return Err(AngstromError::OnlyOncePerBlock);
        }
        self.last_updated_block = Some(block);
        self.block_attested.insert(block, true);
        Ok(())
    }
}
