//! Pool update (§3 "Pool Update", "RewardsUpdate"): one swap-and-reward
//! instruction per pool touched by the bundle.
//!
//! The `current-only` bit doubles as both a struct-level variant flag and
//! the `RewardsUpdate` discriminant — there is no separate selector for
//! `RewardsUpdate` because the wire format only ever decides between the
//! two variants via this one bit (§3: "Variant flags = {zero-for-one,
//! current-only}").

use alloy_primitives::U256;

use crate::error::Result;
use crate::pade::{decode_list, DecodeBudget, PadeDecode, VariantBitmap};
use crate::reader::Reader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardsUpdate {
    CurrentOnly { amount: u128, expected_liquidity: u128 },
    MultiTick { start_tick: i32, start_liquidity: u128, quantities: Vec<u128>, reward_checksum: U256 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolUpdate {
    pub zero_for_one: bool,
    pub pair_index: u16,
    pub swap_in_quantity: u128,
    pub rewards_update: RewardsUpdate,
}

impl PadeDecode for PoolUpdate {
    fn pade_decode(reader: &mut Reader, budget: &mut DecodeBudget) -> Result<Self> {
        let mut bitmap = VariantBitmap::read(reader, 2)?;
        let zero_for_one = bitmap.next_bit()?;
        let current_only = bitmap.next_bit()?;

        let pair_index = reader.read_u16()?;
        let swap_in_quantity = reader.read_u128()?;

        let rewards_update = if current_only {
            let amount = reader.read_u128()?;
            let expected_liquidity = reader.read_u128()?;
            RewardsUpdate::CurrentOnly { amount, expected_liquidity }
        } else {
            let start_tick = reader.read_i24()?;
            let start_liquidity = reader.read_u128()?;
            let quantities = decode_list::<U128Quantity>(reader, budget)?
                .into_iter()
                .map(|q| q.0)
                .collect();
            let reward_checksum = reader.read_u160()?;
            RewardsUpdate::MultiTick { start_tick, start_liquidity, quantities, reward_checksum }
        };

        Ok(Self { zero_for_one, pair_index, swap_in_quantity, rewards_update })
    }
}

/// `u128` has no inherent `PadeDecode` impl (there is no single universal
/// width for "a bare number" in this format); this newtype lets
/// `quantities: List<u128>` reuse `decode_list`.
struct U128Quantity(u128);

impl PadeDecode for U128Quantity {
    fn pade_decode(reader: &mut Reader, _budget: &mut DecodeBudget) -> Result<Self> {
        Ok(Self(reader.read_u128()?))
    }
}

pub fn decode_pool_updates(reader: &mut Reader, budget: &mut DecodeBudget) -> Result<Vec<PoolUpdate>> {
    decode_list(reader, budget)
}
