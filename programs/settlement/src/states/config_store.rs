//! Pool-config store (§4.3): an append-only, read-optimized registry of
//! `(pair-key → tick-spacing, bundle-fee)`. Re-created wholesale on every
//! configuration change rather than patched in place, the way the
//! teacher's `AmmConfig` account is rewritten by the controller rather than
//! mutated field-by-field.

use alloy_primitives::{keccak256, Address, B256};

use crate::error::{AngstromError, Result};
use crate::libraries::fixed_point::{MAX_BUNDLE_FEE_MICROBIPS, MAX_UNLOCKED_FEE_MICROBIPS};
use crate::libraries::tick_math::validate_tick;

/// Upper 27 bytes of `keccak256(asset0 || asset1)`, `asset0 < asset1`.
pub type PairKey = [u8; 27];

pub fn pair_key(asset0: Address, asset1: Address) -> PairKey {
    debug_assert!(asset0 < asset1);
    let mut buf = [0u8; 40];
    buf[..20].copy_from_slice(asset0.as_slice());
    buf[20..].copy_from_slice(asset1.as_slice());
    let digest: B256 = keccak256(buf);
    let mut key = [0u8; 27];
    key.copy_from_slice(&digest[..27]);
    key
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfigEntry {
    pub pair_key: PairKey,
    pub tick_spacing: u16,
    /// Microbips, ≤ `MAX_BUNDLE_FEE_MICROBIPS`.
    pub bundle_fee: u32,
}

/// The store proper plus the parallel unlocked-fee map (§4.3, §4.10). Both
/// are rebuilt together by `configure_pool`/`remove_pool`/
/// `batch_update_pools` (§6 "Controller operations").
#[derive(Debug, Clone, Default)]
pub struct PoolConfigStore {
    entries: Vec<PoolConfigEntry>,
    unlocked_fees: ahash::AHashMap<PairKey, u32>,
}

impl PoolConfigStore {
    pub fn new() -> Self {
        Self { entries: Vec::new(), unlocked_fees: ahash::AHashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookup by `(pair-key, store-index)`: the index is a hint from the
    /// bundle, the pair-key is authoritative. A stale index — the store was
    /// rewritten between bundle construction and execution — must hard
    /// fail rather than silently resolve to the wrong pair (I4).
    pub fn resolve(
        &self,
        expected_key: PairKey,
        store_index: u16,
    ) -> Result<(u16, u32)> {
        let entry = self
            .entries
            .get(store_index as usize)
            .ok_or(AngstromError::IndexMayHaveChanged)?;
        if entry.pair_key != expected_key {
            return Err(AngstromError::EntryKeyMismatch);
        }
        Ok((entry.tick_spacing, entry.bundle_fee))
    }

    pub fn unlocked_fee(&self, key: PairKey) -> Result<u32> {
        self.unlocked_fees
            .get(&key)
            .copied()
            .ok_or(AngstromError::UnlockedFeeNotSet)
    }

    /// Configure (insert or update) one pair. The caller supplies the full
    /// desired entry; the store is conceptually re-created, so this simply
    /// appends or overwrites in place — there is no partial-field patch.
    pub fn configure_pool(
        &mut self,
        asset0: Address,
        asset1: Address,
        tick_spacing: u16,
        bundle_fee: u32,
        unlocked_fee: u32,
    ) -> Result<()> {
        if bundle_fee > MAX_BUNDLE_FEE_MICROBIPS {
            return Err(AngstromError::FeeAboveMax);
        }
        if unlocked_fee > MAX_UNLOCKED_FEE_MICROBIPS {
            return Err(AngstromError::UnlockFeeAboveMax);
        }
        validate_tick(0, tick_spacing as i32)?;
        let (lo, hi) = if asset0 < asset1 { (asset0, asset1) } else { (asset1, asset0) };
        let key = pair_key(lo, hi);
        let entry = PoolConfigEntry { pair_key: key, tick_spacing, bundle_fee };
        match self.entries.iter_mut().find(|e| e.pair_key == key) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        self.unlocked_fees.insert(key, unlocked_fee);
        Ok(())
    }

    /// Remove-with-swap-and-shrink (§4.3 `remove(key, index)`): the caller
    /// asserts both the key and the index it expects to find it at, so a
    /// racing controller write is caught the same way a stale bundle index
    /// is.
    pub fn remove_pool(&mut self, expected_key: PairKey, store_index: u16) -> Result<()> {
        let (tick_spacing, _) = self.resolve(expected_key, store_index)?;
        let _ = tick_spacing;
        let last = self.entries.len() - 1;
        self.entries.swap(store_index as usize, last);
        self.entries.pop();
        self.unlocked_fees.remove(&expected_key);
        Ok(())
    }

    /// `batch-update-pools` (§6): applies a run of `configure_pool`-shaped
    /// updates as one unit — if any entry in the batch is rejected, the
    /// store is left exactly as it was before the call rather than partially
    /// applied.
    pub fn batch_update(
        &mut self,
        updates: &[(Address, Address, u16, u32, u32)],
    ) -> Result<()> {
        let snapshot = self.clone();
        for &(asset0, asset1, tick_spacing, bundle_fee, unlocked_fee) in updates {
            if let Err(err) = self.configure_pool(asset0, asset1, tick_spacing, bundle_fee, unlocked_fee) {
                *self = snapshot;
                return Err(err);
            }
        }
        Ok(())
    }
}
