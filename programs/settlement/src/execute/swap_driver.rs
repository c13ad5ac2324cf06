//! Swap Driver (§4.8): runs one `PoolUpdate` against the host AMM, crosses
//! every tick the swap touched in the growth accumulator, then applies the
//! update's reward distribution.

use alloy_primitives::Address;

use crate::error::Result;
use crate::host::HostAmm;
use crate::states::delta::DeltaTracker;
use crate::states::growth::PoolRewards;
use crate::states::pool_update::{PoolUpdate, RewardsUpdate};

pub struct SwapDriverPair {
    pub asset0: Address,
    pub asset1: Address,
    pub tick_spacing: u16,
}

/// Runs one pool update: swap (if `swap_in_quantity > 0`), tick crossing,
/// then reward distribution. The swap's own AMM-side delta is accounted
/// externally by the AMM (§4.8) — only the reward distribution's asset0
/// debit is tracked here.
pub fn run_pool_update(
    host_amm: &mut dyn HostAmm,
    rewards: &mut PoolRewards,
    delta: &mut DeltaTracker,
    pair: &SwapDriverPair,
    update: &PoolUpdate,
) -> Result<()> {
    if update.swap_in_quantity > 0 {
        let crossings = host_amm.swap_exact_in(
            pair.asset0,
            pair.asset1,
            pair.tick_spacing,
            update.zero_for_one,
            update.swap_in_quantity,
        )?;
        for crossing in &crossings {
            rewards.cross(crossing.tick);
            tracing::trace!(
                tick = crossing.tick,
                direction = ?crossing.direction,
                "swap driver crossed tick"
            );
        }
    }

    let current_liquidity = host_amm.current_liquidity(pair.asset0, pair.asset1, pair.tick_spacing)?;

    let distributed = match &update.rewards_update {
        RewardsUpdate::CurrentOnly { amount, expected_liquidity } => {
            rewards.distribute_current_only(*amount, *expected_liquidity, current_liquidity)?
        }
        RewardsUpdate::MultiTick { start_tick, start_liquidity, quantities, reward_checksum } => {
            let current_tick = host_amm.current_tick(pair.asset0, pair.asset1, pair.tick_spacing)?;
            let going_up = *start_tick <= current_tick;
            let initialized_ticks = host_amm.initialized_ticks_between(
                pair.asset0,
                pair.asset1,
                pair.tick_spacing,
                *start_tick,
                current_tick,
            )?;
            rewards.distribute_multi_tick(
                *start_tick,
                *start_liquidity,
                quantities,
                *reward_checksum,
                &initialized_ticks,
                current_liquidity,
                going_up,
            )?
        }
    };

    if distributed > 0 {
        delta.sub(pair.asset0, distributed)?;
    }
    Ok(())
}
