//! Growth accumulator (§4.5): the per-pool global reward scalar and the
//! per-tick "growth-outside" ledger, maintained on tick crossings during
//! swaps and on reward distribution.
//!
//! Grounded in the teacher's `TickState::{update, cross}` and
//! `get_fee_growth_inside` (`states/tick.rs`), generalized from the
//! teacher's two hardcoded token-side accumulators plus a fixed-size
//! reward array to this spec's single X128 accumulator keyed by an
//! unbounded tick space — hence the `HashMap` instead of a tick-array of
//! fixed-size pages (§9: "a map keyed by tick is sufficient").

use alloy_primitives::{keccak256, U256};

use crate::error::{AngstromError, Result};
use crate::libraries::full_math::mul_x128_div_floor;

#[derive(Debug, Clone, Default)]
pub struct PoolRewards {
    pub global_growth: U256,
    growth_outside: ahash::AHashMap<i32, U256>,
}

impl PoolRewards {
    pub fn new() -> Self {
        Self { global_growth: U256::ZERO, growth_outside: ahash::AHashMap::new() }
    }

    fn outside(&self, tick: i32) -> U256 {
        self.growth_outside.get(&tick).copied().unwrap_or(U256::ZERO)
    }

    /// Seeds `growth_outside[tick]` to the current `global_growth` the first
    /// time `tick` is initialized (§4.6: "if lower or upper tick is being
    /// initialized ... initialize growth-outside[tick] <- global-growth").
    /// A no-op if the tick already has an entry, so repeat calls across
    /// multiple add-liquidity events into the same tick are harmless.
    pub fn seed_growth_outside(&mut self, tick: i32) {
        let global = self.global_growth;
        self.growth_outside.entry(tick).or_insert(global);
    }

    /// Flip `growth_outside[tick]` on a tick crossing (§4.5): wrapping
    /// subtraction is deliberate — `global_growth` only ever grows, so the
    /// difference is well-defined mod 2^256 even once it wraps.
    pub fn cross(&mut self, tick: i32) {
        let flipped = self.global_growth.wrapping_sub(self.outside(tick));
        self.growth_outside.insert(tick, flipped);
        tracing::trace!(tick, "crossed tick in growth accumulator");
    }

    /// Growth accumulated while the current tick sits inside `[lower,
    /// upper)` (§4.5).
    pub fn growth_inside(&self, current_tick: i32, lower: i32, upper: i32) -> U256 {
        if current_tick < lower {
            self.outside(lower).wrapping_sub(self.outside(upper))
        } else if current_tick >= upper {
            self.outside(upper).wrapping_sub(self.outside(lower))
        } else {
            self.global_growth
                .wrapping_sub(self.outside(lower))
                .wrapping_sub(self.outside(upper))
        }
    }

    /// `CurrentOnly{amount, expected_liquidity}` (§4.5): a flat X128
    /// donation to the current tick's range. Zero amount or zero expected
    /// liquidity is a documented no-op hazard (S4), not an error.
    pub fn distribute_current_only(
        &mut self,
        amount: u128,
        expected_liquidity: u128,
        current_pool_liquidity: u128,
    ) -> Result<u128> {
        if amount == 0 || expected_liquidity == 0 {
            return Ok(0);
        }
        if current_pool_liquidity != expected_liquidity {
            return Err(AngstromError::JustInTimeLiquidityChange);
        }
        let growth = mul_x128_div_floor(amount, expected_liquidity)
            .ok_or(AngstromError::ArithmeticOverflowUnderflow)?;
        self.global_growth = self.global_growth.wrapping_add(growth);
        Ok(amount)
    }

    /// `MultiTick{start_tick, start_liquidity, quantities, reward_checksum}`
    /// (§4.5): donate across a contiguous run of initialized ticks from
    /// `start_tick` up to (or down to) the current tick, checksumming the
    /// walk so a JIT liquidity change between matching and execution is
    /// detectable (S5).
    ///
    /// `initialized_ticks` lists, in traversal order, every initialized
    /// tick strictly between `start_tick` and the current tick along with
    /// its signed net-liquidity delta (as the host AMM would report via
    /// `HostAmm::initialized_ticks_between`); the caller has already
    /// decided direction from `start_tick <= current_tick`.
    pub fn distribute_multi_tick(
        &mut self,
        start_tick: i32,
        start_liquidity: u128,
        quantities: &[u128],
        reward_checksum: U256,
        initialized_ticks: &[(i32, i128)],
        end_liquidity: u128,
        going_up: bool,
    ) -> Result<u128> {
        if quantities.is_empty() {
            return Err(AngstromError::ArithmeticOverflowUnderflow);
        }
        if initialized_ticks.len() != quantities.len() - 1 {
            return Err(AngstromError::ArithmeticOverflowUnderflow);
        }

        let mut running_liquidity = start_liquidity;
        let mut running_checksum = B256_ZERO;
        let mut cumulative = U256::ZERO;
        let mut total: u128 = 0;

        for (quantity, (tick, net_liquidity)) in
            quantities[..quantities.len() - 1].iter().zip(initialized_ticks.iter())
        {
            let growth = if running_liquidity == 0 {
                U256::ZERO
            } else {
                mul_x128_div_floor(*quantity, running_liquidity)
                    .ok_or(AngstromError::ArithmeticOverflowUnderflow)?
            };
            cumulative = cumulative.wrapping_add(growth);
            let entry = self.growth_outside.entry(*tick).or_insert(U256::ZERO);
            *entry = entry.wrapping_add(cumulative);
            total = total.checked_add(*quantity).ok_or(AngstromError::ArithmeticOverflowUnderflow)?;

            running_checksum = checksum_step(running_checksum, running_liquidity, *tick);
            running_liquidity = if going_up {
                crate::libraries::liquidity_math::add_delta(running_liquidity, *net_liquidity)?
            } else {
                crate::libraries::liquidity_math::add_delta(running_liquidity, -*net_liquidity)?
            };
        }

        let last_quantity = *quantities.last().unwrap();
        let last_growth = if running_liquidity == 0 {
            U256::ZERO
        } else {
            mul_x128_div_floor(last_quantity, running_liquidity)
                .ok_or(AngstromError::ArithmeticOverflowUnderflow)?
        };
        cumulative = cumulative.wrapping_add(last_growth);
        total = total.checked_add(last_quantity).ok_or(AngstromError::ArithmeticOverflowUnderflow)?;

        if running_liquidity != end_liquidity {
            return Err(AngstromError::WrongEndLiquidity);
        }
        if checksum_high_160(running_checksum) != reward_checksum {
            return Err(AngstromError::JustInTimeLiquidityChange);
        }

        self.global_growth = self.global_growth.wrapping_add(cumulative);
        Ok(total)
    }
}

const B256_ZERO: U256 = U256::ZERO;

fn checksum_step(prev: U256, liquidity: u128, tick: i32) -> U256 {
    let mut buf = [0u8; 32 + 16 + 4];
    buf[..32].copy_from_slice(&prev.to_be_bytes::<32>());
    buf[32..48].copy_from_slice(&liquidity.to_be_bytes());
    buf[48..].copy_from_slice(&tick.to_be_bytes());
    U256::from_be_bytes(keccak256(buf).0)
}

/// High 160 bits, matching the `u160` width the wire format carries the
/// checksum as (§3 `RewardsUpdate::MultiTick.reward-checksum: u160`).
fn checksum_high_160(checksum: U256) -> U256 {
    checksum >> 96
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeding_an_uninitialized_tick_takes_current_global_growth() {
        let mut rewards = PoolRewards::new();
        rewards.global_growth = U256::from(4_000u64);
        rewards.seed_growth_outside(5);
        assert_eq!(rewards.outside(5), U256::from(4_000u64));
    }

    #[test]
    fn seeding_an_already_initialized_tick_is_a_noop() {
        let mut rewards = PoolRewards::new();
        rewards.global_growth = U256::from(1_000u64);
        rewards.cross(5);
        let after_cross = rewards.outside(5);
        rewards.global_growth = U256::from(9_000u64);
        rewards.seed_growth_outside(5);
        assert_eq!(rewards.outside(5), after_cross);
    }

    #[test]
    fn crossing_twice_is_idempotent() {
        let mut rewards = PoolRewards::new();
        rewards.global_growth = U256::from(1000u64);
        rewards.cross(5);
        let after_first = rewards.outside(5);
        rewards.cross(5);
        assert_eq!(rewards.outside(5), rewards.global_growth.wrapping_sub(after_first));
        rewards.cross(5);
        assert_eq!(rewards.outside(5), after_first);
    }

    #[test]
    fn current_only_zero_liquidity_is_noop() {
        let mut rewards = PoolRewards::new();
        let distributed = rewards.distribute_current_only(10_000, 0, 0).unwrap();
        assert_eq!(distributed, 0);
        assert_eq!(rewards.global_growth, U256::ZERO);
    }

    #[test]
    fn current_only_mismatched_liquidity_fails() {
        let mut rewards = PoolRewards::new();
        assert_eq!(
            rewards.distribute_current_only(10_000, 500, 400),
            Err(AngstromError::JustInTimeLiquidityChange)
        );
    }

    #[test]
    fn current_only_credits_global_growth() {
        let mut rewards = PoolRewards::new();
        let distributed = rewards.distribute_current_only(1_000_000, 1_000, 1_000).unwrap();
        assert_eq!(distributed, 1_000_000);
        assert!(rewards.global_growth > U256::ZERO);
    }

    #[test]
    fn multi_tick_end_liquidity_mismatch_fails() {
        let mut rewards = PoolRewards::new();
        let result = rewards.distribute_multi_tick(
            0,
            1_000,
            &[100, 200],
            U256::ZERO,
            &[(10, 50)],
            999_999,
            true,
        );
        assert_eq!(result, Err(AngstromError::WrongEndLiquidity));
    }
}
