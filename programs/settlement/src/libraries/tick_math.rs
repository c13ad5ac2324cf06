//! Tick bounds (§4.3, §4.6). The sqrt-price/tick conversion math itself
//! belongs to the host AMM (`HostAmm`, out of scope per §1) — this module
//! only carries the bounds that the config store and position ledger must
//! check ticks against.

use crate::error::{AngstromError, Result};

/// Matches the bound a Uniswap-V4-style host AMM enforces; chosen over the
/// teacher's Solana-specific `-307200` since this crate targets the same
/// EVM-shaped tick space the host exposes.
pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = -MIN_TICK;

/// A tick must fall within `[MIN_TICK, MAX_TICK]` and be an exact multiple
/// of `tick_spacing`. There is deliberately no upper bound placed on
/// `tick_spacing` itself (§9: "No tick-spacing upper-bound check" is a
/// documented hazard of the config store, not a bug to paper over here).
pub fn validate_tick(tick: i32, tick_spacing: i32) -> Result<()> {
    if tick < MIN_TICK || tick > MAX_TICK {
        return Err(AngstromError::InvalidTickSpacing);
    }
    if tick_spacing <= 0 || tick % tick_spacing != 0 {
        return Err(AngstromError::InvalidTickSpacing);
    }
    Ok(())
}
