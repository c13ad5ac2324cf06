//! Pair table (§3, §4.9 phase 3): resolves a bundle-local `(index0, index1)`
//! into a priced, config-backed trading pair.

use alloy_primitives::U256;

use crate::error::{AngstromError, Result};
use crate::libraries::fixed_point::RAY;
use crate::pade::{DecodeBudget, PadeDecode};
use crate::reader::Reader;

/// `price_1_over_0` is RAY-scaled; the inverse is cached at load so order
/// validation never repeats the division.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair {
    pub index0: u16,
    pub index1: u16,
    pub store_index: u16,
    pub price_1_over_0: U256,
    pub price_0_over_1: U256,
}

impl PadeDecode for Pair {
    fn pade_decode(reader: &mut Reader, _budget: &mut DecodeBudget) -> Result<Self> {
        let index0 = reader.read_u16()?;
        let index1 = reader.read_u16()?;
        let store_index = reader.read_u16()?;
        let price_1_over_0 = reader.read_u256()?;
        let price_0_over_1 = if price_1_over_0.is_zero() {
            U256::ZERO
        } else {
            RAY.checked_mul(RAY)
                .and_then(|ray_sq| ray_sq.checked_div(price_1_over_0))
                .unwrap_or(U256::ZERO)
        };
        Ok(Self { index0, index1, store_index, price_1_over_0, price_0_over_1 })
    }
}

/// I3: `index0 < index1` for every pair, and the list is strictly ascending
/// by `(index0, index1)` (implies uniqueness of orientation).
pub fn validate_pairs_ordered(pairs: &[Pair]) -> Result<()> {
    for p in pairs {
        if p.index0 >= p.index1 {
            return Err(AngstromError::PairAssetsWrong);
        }
    }
    for w in pairs.windows(2) {
        if (w[0].index0, w[0].index1) >= (w[1].index0, w[1].index1) {
            return Err(AngstromError::OutOfOrderOrDuplicatePairs);
        }
    }
    Ok(())
}
