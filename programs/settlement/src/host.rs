//! Host-boundary traits (§1 "Out of scope", §6 "AMM callbacks",
//! §9 "Signature abstraction"). Everything in this module is a capability
//! surface the embedding chain runtime implements; the core only calls
//! through it.

use alloy_primitives::{Address, B256};

use crate::error::Result;

/// One initialized tick the swap driver crossed, reported back by the host
/// AMM so the growth accumulator can flip it (§4.8, §3 SUPPLEMENT).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickCrossing {
    pub tick: i32,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ZeroForOne,
    OneForZero,
}

/// A position key, matching the host AMM's own derivation (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionKey {
    pub pool_id: B256,
    pub owner: Address,
    pub lower_tick: i32,
    pub upper_tick: i32,
    pub salt: B256,
}

/// The concentrated-liquidity pool manager this core sits in front of.
/// Tick-bitmap traversal, sqrt-price math, and swap-step execution all
/// live on the other side of this trait (§1 Out of scope) — the core only
/// issues a swap and observes what it crossed.
pub trait HostAmm {
    /// Exact-input swap with no price limit beyond the swap's own
    /// direction (§4.8). Returns the ticks crossed, in traversal order.
    fn swap_exact_in(
        &mut self,
        asset0: Address,
        asset1: Address,
        tick_spacing: u16,
        zero_for_one: bool,
        amount_in: u128,
    ) -> Result<Vec<TickCrossing>>;

    fn current_tick(&self, asset0: Address, asset1: Address, tick_spacing: u16) -> Result<i32>;

    fn current_liquidity(&self, asset0: Address, asset1: Address, tick_spacing: u16) -> Result<u128>;

    /// Initialized ticks strictly between `start_tick` and `current_tick`,
    /// in the direction implied by their relative order, each paired with
    /// its signed net-liquidity delta (§4.5 `MultiTick`).
    fn initialized_ticks_between(
        &self,
        asset0: Address,
        asset1: Address,
        tick_spacing: u16,
        start_tick: i32,
        current_tick: i32,
    ) -> Result<Vec<(i32, i128)>>;

    /// Grants this core exclusive write access to the AMM for the duration
    /// of the bundle (§4.9 phase 2, §5: "sole writer ... enforced by the
    /// Unlock Gate"). Released with `release_unlock` once settlement
    /// completes, successfully or not.
    fn acquire_unlock(&mut self) -> Result<()>;

    fn release_unlock(&mut self) -> Result<()>;

    /// Pull `amount` of `asset` out of the AMM's custody at the start of
    /// the bundle (§4.9 phase 4 "Take").
    fn take(&mut self, asset: Address, amount: u128) -> Result<()>;

    /// Return `amount` of `asset` to the AMM's native accounting (§4.9
    /// phase 8 "Save & settle").
    fn settle(&mut self, asset: Address, amount: u128) -> Result<()>;

    /// Pulls `amount` of `asset` from `from`'s external balance into the
    /// settlement contract's custody (§4.7 steps 7-8, the `use-internal =
    /// false` input leg — a real token movement rather than a ledger entry).
    fn transfer_in(&mut self, asset: Address, from: Address, amount: u128) -> Result<()>;

    /// Pushes `amount` of `asset` from the settlement contract's custody to
    /// `to` (§4.7 steps 7-8, the `use-internal = false` output leg).
    fn transfer_out(&mut self, asset: Address, to: Address, amount: u128) -> Result<()>;

    /// Controller `pull-fee` (§6): withdraws `amount` of the accumulated
    /// `save`-bucket fees for `asset` to `to`. Where `save` amounts
    /// physically sit is the host's concern, not this core's.
    fn pull_fee(&mut self, asset: Address, to: Address, amount: u128) -> Result<()>;
}

/// One interface, two implementations (§9): recoverable secp256k1
/// signatures and smart-contract callback signatures. Recovery itself is
/// out of scope (§1) — this crate only calls through the trait.
pub trait SignatureVerifier {
    fn verify_ecdsa(&self, signer: Address, digest: B256, v: u8, r: B256, s: B256) -> Result<bool>;

    /// Contract-signature callback; must return the 4-byte magic
    /// `0x1626ba7e` to count as valid (EIP-1271-style).
    fn verify_contract_signature(
        &self,
        signer: Address,
        digest: B256,
        payload: &[u8],
    ) -> Result<bool>;
}

/// Magic return value for a composable order hook (§4.7 step 4, §9
/// "Hooks"): low 4 bytes of `keccak256("Angstrom.hook.return-magic")`.
pub use crate::typed_data::HOOK_RETURN_MAGIC;

pub trait ComposeHook {
    /// Dispatches to the order's declared `hook_address` (§4.7 step 4); the
    /// `signer` is the order's signer, passed through so the hook can
    /// condition its behavior on who it is composing for.
    fn compose(&mut self, hook_address: Address, signer: Address, payload: &[u8]) -> Result<u32>;
}

/// Backing store for the "operator set" (§2 Auth & Lifecycle, §6
/// `toggle-operators`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignerAuthority {
    pub address: Address,
    pub is_active: bool,
}
