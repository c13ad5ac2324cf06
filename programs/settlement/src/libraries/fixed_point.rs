//! Fixed-point scales used throughout the core: RAY (10^27) for prices and
//! fees, X128 (2^128) for reward growth accumulators (§9 "Integer precision").

use alloy_primitives::U256;

/// 10^27-scaled fixed point, used for `price-1-over-0` and derived prices.
pub const RAY: U256 = U256::from_limbs([11_515_845_246_265_065_472, 54_210_108, 0, 0]);

/// 10^6-scaled microbip denominator for fees (1e6 == 100%).
pub const MICROBIP_DENOMINATOR: u64 = 1_000_000;

/// 2^128, used as the denominator for reward-growth accumulation.
pub const X128: U256 = U256::from_limbs([0, 0, 1, 0]);

pub const MAX_BUNDLE_FEE_MICROBIPS: u32 = 200_000;
pub const MAX_UNLOCKED_FEE_MICROBIPS: u32 = 400_000;
