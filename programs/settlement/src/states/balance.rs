//! Internal balances (§6 `deposit`/`withdraw`, §4.7 step 7/8 `use-internal`):
//! a per-(signer, asset) ledger that orders can settle against instead of an
//! external token transfer.

use alloy_primitives::Address;

use crate::error::{AngstromError, Result};

#[derive(Debug, Clone, Default)]
pub struct InternalBalances {
    balances: ahash::AHashMap<(Address, Address), u128>,
}

impl InternalBalances {
    pub fn new() -> Self {
        Self { balances: ahash::AHashMap::new() }
    }

    pub fn get(&self, owner: Address, asset: Address) -> u128 {
        self.balances.get(&(owner, asset)).copied().unwrap_or(0)
    }

    pub fn deposit(&mut self, owner: Address, asset: Address, amount: u128) -> Result<()> {
        let entry = self.balances.entry((owner, asset)).or_insert(0);
        *entry = entry.checked_add(amount).ok_or(AngstromError::ArithmeticOverflowUnderflow)?;
        Ok(())
    }

    pub fn withdraw(&mut self, owner: Address, asset: Address, amount: u128) -> Result<()> {
        let entry = self.balances.entry((owner, asset)).or_insert(0);
        *entry = entry.checked_sub(amount).ok_or(AngstromError::ArithmeticOverflowUnderflow)?;
        Ok(())
    }
}
