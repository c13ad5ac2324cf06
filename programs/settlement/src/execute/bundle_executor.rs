//! Bundle Executor (§4.9): the nine-phase pipeline that decodes, validates,
//! and settles one operator-submitted bundle per block.

use alloy_primitives::{keccak256, Address, B256};

use crate::error::{AngstromError, Result};
use crate::host::{ComposeHook, HostAmm, PositionKey, SignatureVerifier};
use crate::pade::DecodeBudget;
use crate::reader::Reader;
use crate::states::auth::AuthState;
use crate::states::balance::InternalBalances;
use crate::states::bundle::Bundle;
use crate::states::config_store::{pair_key, PairKey, PoolConfigStore};
use crate::states::delta::DeltaTracker;
use crate::states::growth::PoolRewards;
use crate::states::nonce::NonceBitmaps;
use crate::states::position::PositionLedger;

use super::order_validator::{
    self, build_domain_separator, OrderExecutionContext, OrderPricing,
};
use super::swap_driver::{self, SwapDriverPair};

struct ResolvedPair {
    asset0: Address,
    asset1: Address,
    tick_spacing: u16,
    bundle_fee_microbips: u32,
    price_0_over_1: alloy_primitives::U256,
    price_1_over_0: alloy_primitives::U256,
}

/// All cross-bundle state the core owns between one `execute` call and the
/// next (§5 "Shared resources"): the operator/controller registry, the
/// pool-config store, per-signer nonces, internal balances, one growth
/// accumulator per pool, and the position ledger the AMM callbacks update.
pub struct BundleExecutor {
    pub auth: AuthState,
    config_store: PoolConfigStore,
    nonces: NonceBitmaps,
    balances: InternalBalances,
    pool_rewards: ahash::AHashMap<(Address, Address), PoolRewards>,
    position_ledger: PositionLedger,
}

impl BundleExecutor {
    pub fn new(controller: Address) -> Self {
        Self {
            auth: AuthState::new(controller),
            config_store: PoolConfigStore::new(),
            nonces: NonceBitmaps::new(),
            balances: InternalBalances::new(),
            pool_rewards: ahash::AHashMap::new(),
            position_ledger: PositionLedger::new(),
        }
    }

    pub fn config_store(&self) -> &PoolConfigStore {
        &self.config_store
    }

    pub fn nonces(&self) -> &NonceBitmaps {
        &self.nonces
    }

    pub fn balances(&self) -> &InternalBalances {
        &self.balances
    }

    #[allow(clippy::too_many_arguments)]
    pub fn execute(
        &mut self,
        payload: &[u8],
        caller: Address,
        current_block: u64,
        now: u64,
        chain_id: u64,
        verifying_contract: Address,
        host_amm: &mut dyn HostAmm,
        signature_verifier: &dyn SignatureVerifier,
        compose_hook: &mut dyn ComposeHook,
        decode_budget: u32,
    ) -> Result<B256> {
        // Snapshot every piece of core state this call can mutate, restored
        // on any failure so a rejected bundle leaves no trace (I1: atomicity
        // — a failed bundle must leave state byte-for-byte as it was).
        let auth_snapshot = self.auth.clone();
        let nonces_snapshot = self.nonces.clone();
        let balances_snapshot = self.balances.clone();
        let pool_rewards_snapshot = self.pool_rewards.clone();

        // Phase 1: authentication and the one-bundle-per-block lock.
        if let Err(err) = self.auth.require_operator(caller) {
            self.auth = auth_snapshot;
            return Err(err);
        }
        if let Err(err) = self.auth.acquire_block_lock(current_block) {
            self.auth = auth_snapshot;
            return Err(err);
        }

        // Phase 2: acquire exclusive AMM write access for the duration of
        // the bundle; always released, even on failure.
        if let Err(err) = host_amm.acquire_unlock() {
            self.auth = auth_snapshot;
            return Err(err);
        }
        let result = self.execute_locked(
            payload,
            current_block,
            now,
            chain_id,
            verifying_contract,
            host_amm,
            signature_verifier,
            compose_hook,
            decode_budget,
        );
        host_amm.release_unlock()?;

        if result.is_err() {
            self.auth = auth_snapshot;
            self.nonces = nonces_snapshot;
            self.balances = balances_snapshot;
            self.pool_rewards = pool_rewards_snapshot;
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn execute_locked(
        &mut self,
        payload: &[u8],
        current_block: u64,
        now: u64,
        chain_id: u64,
        verifying_contract: Address,
        host_amm: &mut dyn HostAmm,
        signature_verifier: &dyn SignatureVerifier,
        compose_hook: &mut dyn ComposeHook,
        decode_budget: u32,
    ) -> Result<B256> {
        // Phase 3: decode & validate assets/pairs (I2/I3 enforced inside
        // `Bundle::decode`), then resolve each pair against the config
        // store.
        let mut reader = Reader::new(payload);
        let mut budget = DecodeBudget::new(decode_budget);
        let bundle = Bundle::decode(&mut reader, &mut budget)?;

        let mut delta = DeltaTracker::new();

        let mut resolved_pairs = Vec::with_capacity(bundle.pairs.len());
        for pair in &bundle.pairs {
            let asset0 = bundle
                .assets
                .get(pair.index0 as usize)
                .ok_or(AngstromError::AssetIndexOutOfRange)?
                .address;
            let asset1 = bundle
                .assets
                .get(pair.index1 as usize)
                .ok_or(AngstromError::AssetIndexOutOfRange)?
                .address;
            let key = pair_key(asset0, asset1);
            let (tick_spacing, bundle_fee_microbips) = self.config_store.resolve(key, pair.store_index)?;
            resolved_pairs.push(ResolvedPair {
                asset0,
                asset1,
                tick_spacing,
                bundle_fee_microbips,
                price_0_over_1: pair.price_0_over_1,
                price_1_over_0: pair.price_1_over_0,
            });
        }

        // Phase 4: take.
        for asset in &bundle.assets {
            if asset.take > 0 {
                host_amm.take(asset.address, asset.take)?;
                delta.add(asset.address, asset.take)?;
            }
        }

        // Phase 5: pool updates (Swap Driver, §4.8).
        for update in &bundle.pool_updates {
            let resolved = resolved_pairs
                .get(update.pair_index as usize)
                .ok_or(AngstromError::PairIndexOutOfRange)?;
            let rewards = self.pool_rewards.entry((resolved.asset0, resolved.asset1)).or_default();
            let swap_pair = SwapDriverPair {
                asset0: resolved.asset0,
                asset1: resolved.asset1,
                tick_spacing: resolved.tick_spacing,
            };
            swap_driver::run_pool_update(host_amm, rewards, &mut delta, &swap_pair, update)?;
        }

        let domain_separator = build_domain_separator(chain_id, verifying_contract);
        let mut executed_orders = ahash::AHashSet::new();

        // Phase 6: top-of-block orders.
        for order in &bundle.top_of_block_orders {
            let resolved = resolved_pairs
                .get(order.pair_index as usize)
                .ok_or(AngstromError::PairIndexOutOfRange)?;
            let pricing = OrderPricing {
                asset0: resolved.asset0,
                asset1: resolved.asset1,
                price_0_over_1: resolved.price_0_over_1,
                price_1_over_0: resolved.price_1_over_0,
                bundle_fee_microbips: resolved.bundle_fee_microbips,
            };
            let mut ctx = OrderExecutionContext {
                domain_separator,
                current_block,
                now,
                signature_verifier,
                compose_hook,
                host_amm,
                nonces: &mut self.nonces,
                executed_orders: &mut executed_orders,
                delta: &mut delta,
                balances: &mut self.balances,
            };
            order_validator::validate_and_settle_top_of_block_order(&mut ctx, order, &pricing)?;
        }

        // Phase 7: user orders.
        for order in &bundle.user_orders {
            let resolved = resolved_pairs
                .get(order.pair_index as usize)
                .ok_or(AngstromError::PairIndexOutOfRange)?;
            let pricing = OrderPricing {
                asset0: resolved.asset0,
                asset1: resolved.asset1,
                price_0_over_1: resolved.price_0_over_1,
                price_1_over_0: resolved.price_1_over_0,
                bundle_fee_microbips: resolved.bundle_fee_microbips,
            };
            let mut ctx = OrderExecutionContext {
                domain_separator,
                current_block,
                now,
                signature_verifier,
                compose_hook,
                host_amm,
                nonces: &mut self.nonces,
                executed_orders: &mut executed_orders,
                delta: &mut delta,
                balances: &mut self.balances,
            };
            order_validator::validate_and_settle_user_order(&mut ctx, order, &pricing)?;
        }

        // Phase 8: save & settle.
        let mut commitment = Vec::with_capacity(bundle.assets.len() * 36);
        for asset in &bundle.assets {
            delta.require_zero(asset.address, asset.save, asset.settle)?;
            if asset.settle > 0 {
                host_amm.settle(asset.address, asset.settle)?;
            }
            commitment.extend_from_slice(asset.address.as_slice());
            commitment.extend_from_slice(&asset.save.to_be_bytes());
        }

        // Phase 9: fee commitment digest (§6 "Fee commitment log"). Emitting
        // the actual zero-topic event is the embedding host's job; this
        // crate only computes what its single topic must be.
        let digest = keccak256(commitment);
        tracing::info!(block = current_block, commitment = ?digest, "bundle executed");
        Ok(digest)
    }

    /// `before-add-liquidity` (§4.6, §6 "AMM callbacks"): the host AMM calls
    /// this before crediting a position's liquidity, so the position ledger
    /// can snapshot its reward entitlement against the pool's growth
    /// accumulator. `lower_tick_initializing`/`upper_tick_initializing` tell
    /// whether either tick is transitioning from zero to nonzero net
    /// liquidity, in which case its `growth-outside` must be seeded from the
    /// pool's current `global-growth` before the snapshot is taken.
    #[allow(clippy::too_many_arguments)]
    pub fn before_add_liquidity(
        &mut self,
        asset0: Address,
        asset1: Address,
        position: PositionKey,
        current_tick: i32,
        delta_l: u128,
        lower_tick_initializing: bool,
        upper_tick_initializing: bool,
    ) -> Result<()> {
        let rewards = self.pool_rewards.entry((asset0, asset1)).or_default();
        if lower_tick_initializing {
            rewards.seed_growth_outside(position.lower_tick);
        }
        if upper_tick_initializing {
            rewards.seed_growth_outside(position.upper_tick);
        }
        self.position_ledger.on_add_liquidity(rewards, position, current_tick, delta_l)
    }

    /// `before-remove-liquidity` (§4.6, §6 "AMM callbacks"): the host AMM
    /// calls this before debiting a position's liquidity; returns the reward
    /// owed since the last snapshot for the host to pay out.
    pub fn before_remove_liquidity(
        &mut self,
        asset0: Address,
        asset1: Address,
        position: PositionKey,
        current_tick: i32,
        delta_l: u128,
    ) -> u128 {
        let rewards = self.pool_rewards.entry((asset0, asset1)).or_default();
        self.position_ledger.on_remove_liquidity(rewards, position, current_tick, delta_l)
    }

    /// `configure-pool` (§6 "Controller operations").
    pub fn configure_pool(
        &mut self,
        caller: Address,
        asset0: Address,
        asset1: Address,
        tick_spacing: u16,
        bundle_fee: u32,
        unlocked_fee: u32,
    ) -> Result<()> {
        self.auth.require_controller(caller)?;
        self.config_store.configure_pool(asset0, asset1, tick_spacing, bundle_fee, unlocked_fee)
    }

    /// `remove-pool` (§6 "Controller operations").
    pub fn remove_pool(&mut self, caller: Address, expected_key: PairKey, store_index: u16) -> Result<()> {
        self.auth.require_controller(caller)?;
        self.config_store.remove_pool(expected_key, store_index)
    }

    /// `batch-update-pools` (§6 "Controller operations").
    pub fn batch_update_pools(
        &mut self,
        caller: Address,
        updates: &[(Address, Address, u16, u32, u32)],
    ) -> Result<()> {
        self.auth.require_controller(caller)?;
        self.config_store.batch_update(updates)
    }

    /// `pull-fee` (§6 "Controller operations"): the `save`-bucket withdrawal
    /// itself is a host-AMM concern (§1 Out of scope); this only gates it.
    pub fn pull_fee(
        &mut self,
        caller: Address,
        asset: Address,
        to: Address,
        amount: u128,
        host_amm: &mut dyn HostAmm,
    ) -> Result<()> {
        self.auth.require_controller(caller)?;
        host_amm.pull_fee(asset, to, amount)
    }

    /// `deposit` (§6 "Primary entry points"): pulls `amount` of `asset` from
    /// the caller's external balance and credits the internal ledger for
    /// `recipient` (defaults to the caller). Depositing requires no
    /// authorization since it only ever credits a balance.
    pub fn deposit(
        &mut self,
        caller: Address,
        recipient: Option<Address>,
        asset: Address,
        amount: u128,
        host_amm: &mut dyn HostAmm,
    ) -> Result<()> {
        host_amm.transfer_in(asset, caller, amount)?;
        self.balances.deposit(recipient.unwrap_or(caller), asset, amount)
    }

    /// `withdraw` (§6 "Primary entry points"): only the balance's own owner
    /// may withdraw it; `recipient` defaults to the caller.
    pub fn withdraw(
        &mut self,
        caller: Address,
        recipient: Option<Address>,
        asset: Address,
        amount: u128,
        host_amm: &mut dyn HostAmm,
    ) -> Result<()> {
        self.balances.withdraw(caller, asset, amount)?;
        host_amm.transfer_out(asset, recipient.unwrap_or(caller), amount)
    }

    /// `invalidate-nonce` (§6 "Primary entry points"): a signer cancelling
    /// one of their own standing orders ahead of time; the caller is always
    /// the nonce's own owner, never a third party.
    pub fn invalidate_nonce(&mut self, caller: Address, nonce: u64) -> Result<()> {
        self.nonces.invalidate(caller, nonce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::TickCrossing;
    use alloy_primitives::U256;

    struct NoopAmm;
    impl HostAmm for NoopAmm {
        fn swap_exact_in(
            &mut self,
            _asset0: Address,
            _asset1: Address,
            _tick_spacing: u16,
            _zero_for_one: bool,
            _amount_in: u128,
        ) -> Result<Vec<TickCrossing>> {
            Ok(Vec::new())
        }
        fn current_tick(&self, _asset0: Address, _asset1: Address, _tick_spacing: u16) -> Result<i32> {
            Ok(0)
        }
        fn current_liquidity(&self, _asset0: Address, _asset1: Address, _tick_spacing: u16) -> Result<u128> {
            Ok(0)
        }
        fn initialized_ticks_between(
            &self,
            _asset0: Address,
            _asset1: Address,
            _tick_spacing: u16,
            _start_tick: i32,
            _current_tick: i32,
        ) -> Result<Vec<(i32, i128)>> {
            Ok(Vec::new())
        }
        fn acquire_unlock(&mut self) -> Result<()> {
            Ok(())
        }
        fn release_unlock(&mut self) -> Result<()> {
            Ok(())
        }
        fn take(&mut self, _asset: Address, _amount: u128) -> Result<()> {
            Ok(())
        }
        fn settle(&mut self, _asset: Address, _amount: u128) -> Result<()> {
            Ok(())
        }
        fn transfer_in(&mut self, _asset: Address, _from: Address, _amount: u128) -> Result<()> {
            Ok(())
        }
        fn transfer_out(&mut self, _asset: Address, _to: Address, _amount: u128) -> Result<()> {
            Ok(())
        }
        fn pull_fee(&mut self, _asset: Address, _to: Address, _amount: u128) -> Result<()> {
            Ok(())
        }
    }

    struct AlwaysValidSignatures;
    impl SignatureVerifier for AlwaysValidSignatures {
        fn verify_ecdsa(&self, _signer: Address, _digest: B256, _v: u8, _r: B256, _s: B256) -> Result<bool> {
            Ok(true)
        }
        fn verify_contract_signature(&self, _signer: Address, _digest: B256, _payload: &[u8]) -> Result<bool> {
            Ok(true)
        }
    }

    struct NoopHook;
    impl ComposeHook for NoopHook {
        fn compose(&mut self, _hook_address: Address, _signer: Address, _payload: &[u8]) -> Result<u32> {
            Ok(crate::host::HOOK_RETURN_MAGIC)
        }
    }

    #[test]
    fn empty_bundle_succeeds_and_acquires_block_lock() {
        let controller = Address::repeat_byte(1);
        let mut executor = BundleExecutor::new(controller);
        executor.auth.toggle_operators(controller, &[controller]).unwrap();

        let mut buf = Vec::new();
        for _ in 0..5 {
            buf.extend_from_slice(&[0u8, 0, 0]);
        }

        let mut amm = NoopAmm;
        let verifier = AlwaysValidSignatures;
        let mut hook = NoopHook;

        let digest = executor
            .execute(&buf, controller, 1, 0, 1, Address::ZERO, &mut amm, &verifier, &mut hook, 1_000)
            .unwrap();
        assert_eq!(digest, keccak256(Vec::<u8>::new()));

        // P2: a second execution attempt on the same block fails.
        assert_eq!(
            executor.execute(&buf, controller, 1, 0, 1, Address::ZERO, &mut amm, &verifier, &mut hook, 1_000),
            Err(AngstromError::OnlyOncePerBlock)
        );
    }

    #[test]
    fn non_operator_caller_is_rejected() {
        let controller = Address::repeat_byte(1);
        let mut executor = BundleExecutor::new(controller);
        let mut buf = Vec::new();
        for _ in 0..5 {
            buf.extend_from_slice(&[0u8, 0, 0]);
        }
        let mut amm = NoopAmm;
        let verifier = AlwaysValidSignatures;
        let mut hook = NoopHook;
        assert_eq!(
            executor.execute(&buf, Address::repeat_byte(2), 1, 0, 1, Address::ZERO, &mut amm, &verifier, &mut hook, 1_000),
            Err(AngstromError::NotOperator)
        );
        let _ = U256::ZERO;
    }
}
