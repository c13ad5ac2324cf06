//! Position ledger (§4.6): each liquidity position tracks a single
//! `last_growth_inside` snapshot, used to compute the reward owed since
//! the last time liquidity there changed.
//!
//! Grounded in the teacher's `ProtocolPositionState::update` (fee-growth
//! snapshot plus `add_delta`-based liquidity update), generalized from two
//! token-side fee accumulators plus a reward array down to this spec's
//! single X128 reward scalar, and split into explicit add/remove entry
//! points to match the AMM's `before-add`/`before-remove` hook shape
//! (§4.6) instead of the teacher's single `update`.

use alloy_primitives::U256;

use crate::error::Result;
use crate::host::PositionKey;
use crate::libraries::full_math::full_mul_x128_saturating;
use crate::libraries::liquidity_math;
use crate::states::growth::PoolRewards;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub liquidity: u128,
    pub last_growth_inside: U256,
}

#[derive(Debug, Clone, Default)]
pub struct PositionLedger {
    positions: ahash::AHashMap<PositionKey, Position>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self { positions: ahash::AHashMap::new() }
    }

    pub fn get(&self, key: PositionKey) -> Position {
        self.positions.get(&key).copied().unwrap_or_default()
    }

    /// `before-add-liquidity` (§4.6): `delta_l` is the liquidity being
    /// added. When the position starts empty the snapshot is simply taken
    /// fresh; otherwise it is adjusted so the owed reward
    /// `(growth_inside - last_growth_inside) * L` is preserved across the
    /// liquidity change, to within X128 rounding.
    pub fn on_add_liquidity(
        &mut self,
        rewards: &PoolRewards,
        key: PositionKey,
        current_tick: i32,
        delta_l: u128,
    ) -> Result<()> {
        let growth_inside = rewards.growth_inside(current_tick, key.lower_tick, key.upper_tick);
        let position = self.positions.entry(key).or_default();

        if position.liquidity == 0 {
            position.last_growth_inside = growth_inside;
        } else {
            let new_liquidity = position.liquidity + delta_l;
            let growth_delta = growth_inside.wrapping_sub(position.last_growth_inside);
            // Scale the growth delta down by L / L', floor-rounded, so
            // subtracting it from growth_inside yields the adjusted
            // snapshot (§4.6: "preserves the owed reward ... modulo 2^128").
            let scaled_delta = if new_liquidity == 0 {
                U256::ZERO
            } else {
                growth_delta
                    .checked_mul(U256::from(position.liquidity))
                    .and_then(|n| n.checked_div(U256::from(new_liquidity)))
                    .unwrap_or(U256::ZERO)
            };
            position.last_growth_inside = growth_inside.wrapping_sub(scaled_delta);
        }
        position.liquidity = liquidity_math::add_delta(position.liquidity, delta_l as i128)?;
        Ok(())
    }

    /// `before-remove-liquidity` (§4.6): credits the owed reward and resets
    /// the snapshot to the current growth-inside value.
    pub fn on_remove_liquidity(
        &mut self,
        rewards: &PoolRewards,
        key: PositionKey,
        current_tick: i32,
        delta_l: u128,
    ) -> u128 {
        let growth_inside = rewards.growth_inside(current_tick, key.lower_tick, key.upper_tick);
        let position = self.positions.entry(key).or_default();
        let growth_delta = growth_inside.wrapping_sub(position.last_growth_inside);
        let reward = full_mul_x128_saturating(growth_delta, position.liquidity);

        position.liquidity = position.liquidity.saturating_sub(delta_l);
        position.last_growth_inside = growth_inside;
        reward
    }
}
