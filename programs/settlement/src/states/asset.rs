//! Asset table (§3, §4.9 phase 3/8): one entry per token touched by the
//! bundle, ordered and deduplicated by address.

use alloy_primitives::Address;

use crate::error::{AngstromError, Result};
use crate::pade::{DecodeBudget, PadeDecode};
use crate::reader::Reader;

/// `take` is pulled from the AMM at the start of the bundle, `settle` is
/// returned at the end, `save` is the per-bundle fee retained by the
/// contract (operator gas reimbursement, order fees).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Asset {
    pub address: Address,
    pub save: u128,
    pub take: u128,
    pub settle: u128,
}

impl PadeDecode for Asset {
    fn pade_decode(reader: &mut Reader, _budget: &mut DecodeBudget) -> Result<Self> {
        Ok(Self {
            address: reader.read_address()?,
            save: reader.read_u128()?,
            take: reader.read_u128()?,
            settle: reader.read_u128()?,
        })
    }
}

/// I2: assets must be strictly ascending by address (implies uniqueness).
pub fn validate_assets_ordered(assets: &[Asset]) -> Result<()> {
    for pair in assets.windows(2) {
        if pair[0].address >= pair[1].address {
            return Err(AngstromError::AssetsOutOfOrderOrNotUnique);
        }
    }
    Ok(())
}
