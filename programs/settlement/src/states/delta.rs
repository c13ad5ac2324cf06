//! Delta tracker (§4.4): a per-asset signed net-balance accumulator that
//! must zero out per asset at bundle commit (I1).

use alloy_primitives::{Address, I256};

use crate::error::{AngstromError, Result};

#[derive(Debug, Clone, Default)]
pub struct DeltaTracker {
    deltas: ahash::AHashMap<Address, I256>,
}

impl DeltaTracker {
    pub fn new() -> Self {
        Self { deltas: ahash::AHashMap::new() }
    }

    fn entry(&mut self, asset: Address) -> &mut I256 {
        self.deltas.entry(asset).or_insert(I256::ZERO)
    }

    pub fn get(&self, asset: Address) -> I256 {
        self.deltas.get(&asset).copied().unwrap_or(I256::ZERO)
    }

    pub fn add(&mut self, asset: Address, amount: u128) -> Result<()> {
        let delta = self.entry(asset);
        *delta = delta
            .checked_add(I256::try_from(amount).map_err(|_| AngstromError::ArithmeticOverflowUnderflow)?)
            .ok_or(AngstromError::ArithmeticOverflowUnderflow)?;
        Ok(())
    }

    pub fn sub(&mut self, asset: Address, amount: u128) -> Result<I256> {
        let delta = self.entry(asset);
        *delta = delta
            .checked_sub(I256::try_from(amount).map_err(|_| AngstromError::ArithmeticOverflowUnderflow)?)
            .ok_or(AngstromError::ArithmeticOverflowUnderflow)?;
        Ok(*delta)
    }

    /// I1, phase 8 of the bundle executor: `sub(asset, save + settle)` must
    /// land on exactly zero for every asset the bundle listed.
    pub fn require_zero(&mut self, asset: Address, save: u128, settle: u128) -> Result<()> {
        let total = save
            .checked_add(settle)
            .ok_or(AngstromError::ArithmeticOverflowUnderflow)?;
        let remaining = self.sub(asset, total)?;
        if remaining != I256::ZERO {
            return Err(AngstromError::BundleDeltaUnresolved(asset));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn add_then_sub_equal_amounts_zeroes_out() {
        let mut d = DeltaTracker::new();
        let a = addr(1);
        d.add(a, 100).unwrap();
        d.require_zero(a, 0, 100).unwrap();
    }

    #[test]
    fn unresolved_delta_is_an_error() {
        let mut d = DeltaTracker::new();
        let a = addr(1);
        d.add(a, 100).unwrap();
        assert_eq!(
            d.require_zero(a, 0, 50),
            Err(AngstromError::BundleDeltaUnresolved(a))
        );
    }

    #[test]
    fn untouched_asset_defaults_to_zero() {
        let d = DeltaTracker::new();
        assert_eq!(d.get(addr(9)), I256::ZERO);
    }
}
