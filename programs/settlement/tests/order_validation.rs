//! P7 ("every order-level check fires before any settlement mutation"),
//! R3 ("a nonce is consumed at most once"), and S6 ("nonce-reuse rejection
//! leaves the delta tracker at its pre-order state") exercised through
//! `execute::order_validator` end to end.

use alloy_primitives::{Address, B256, U256};
use angstrom_core::error::AngstromError;
use angstrom_core::execute::order_validator::{validate_and_settle_user_order, OrderExecutionContext, OrderPricing};
use angstrom_core::host::{ComposeHook, HostAmm, SignatureVerifier, TickCrossing};
use angstrom_core::libraries::fixed_point::RAY;
use angstrom_core::states::balance::InternalBalances;
use angstrom_core::states::delta::DeltaTracker;
use angstrom_core::states::nonce::NonceBitmaps;
use angstrom_core::states::order::{OrderLifetime, OrderQuantity, Signature, UserOrder};

struct AlwaysValidSignatures;
impl SignatureVerifier for AlwaysValidSignatures {
    fn verify_ecdsa(&self, _signer: Address, _digest: B256, _v: u8, _r: B256, _s: B256) -> angstrom_core::Result<bool> {
        Ok(true)
    }
    fn verify_contract_signature(&self, _signer: Address, _digest: B256, _payload: &[u8]) -> angstrom_core::Result<bool> {
        Ok(true)
    }
}

struct NoopHook;
impl ComposeHook for NoopHook {
    fn compose(&mut self, _hook_address: Address, _signer: Address, _payload: &[u8]) -> angstrom_core::Result<u32> {
        Ok(angstrom_core::host::HOOK_RETURN_MAGIC)
    }
}

struct NoopAmm;
impl HostAmm for NoopAmm {
    fn swap_exact_in(&mut self, _a0: Address, _a1: Address, _ts: u16, _zfo: bool, _amt: u128) -> angstrom_core::Result<Vec<TickCrossing>> {
        Ok(Vec::new())
    }
    fn current_tick(&self, _a0: Address, _a1: Address, _ts: u16) -> angstrom_core::Result<i32> {
        Ok(0)
    }
    fn current_liquidity(&self, _a0: Address, _a1: Address, _ts: u16) -> angstrom_core::Result<u128> {
        Ok(0)
    }
    fn initialized_ticks_between(&self, _a0: Address, _a1: Address, _ts: u16, _start: i32, _cur: i32) -> angstrom_core::Result<Vec<(i32, i128)>> {
        Ok(Vec::new())
    }
    fn acquire_unlock(&mut self) -> angstrom_core::Result<()> {
        Ok(())
    }
    fn release_unlock(&mut self) -> angstrom_core::Result<()> {
        Ok(())
    }
    fn take(&mut self, _asset: Address, _amount: u128) -> angstrom_core::Result<()> {
        Ok(())
    }
    fn settle(&mut self, _asset: Address, _amount: u128) -> angstrom_core::Result<()> {
        Ok(())
    }
    fn transfer_in(&mut self, _asset: Address, _from: Address, _amount: u128) -> angstrom_core::Result<()> {
        Ok(())
    }
    fn transfer_out(&mut self, _asset: Address, _to: Address, _amount: u128) -> angstrom_core::Result<()> {
        Ok(())
    }
    fn pull_fee(&mut self, _asset: Address, _to: Address, _amount: u128) -> angstrom_core::Result<()> {
        Ok(())
    }
}

fn pricing() -> OrderPricing {
    OrderPricing {
        asset0: Address::repeat_byte(1),
        asset1: Address::repeat_byte(2),
        price_0_over_1: RAY,
        price_1_over_0: RAY,
        bundle_fee_microbips: 0,
    }
}

fn base_order() -> UserOrder {
    UserOrder {
        signer: Address::repeat_byte(9),
        quantity: OrderQuantity::Exact { amount: 1_000, exact_in: true },
        lifetime: OrderLifetime::Standing { nonce: 1, deadline: 100 },
        pair_index: 0,
        zero_for_one: true,
        use_internal: false,
        min_price: U256::ZERO,
        recipient: None,
        hook: None,
        extra_fee_cap: 100,
        extra_fee: 0,
        signature: Signature::Ecdsa { v: 27, r: B256::ZERO, s: B256::ZERO },
    }
}

struct Harness {
    nonces: NonceBitmaps,
    executed: ahash::AHashSet<(Address, B256)>,
    delta: DeltaTracker,
    balances: InternalBalances,
    verifier: AlwaysValidSignatures,
    hook: NoopHook,
    amm: NoopAmm,
}

impl Harness {
    fn new() -> Self {
        Self {
            nonces: NonceBitmaps::new(),
            executed: ahash::AHashSet::new(),
            delta: DeltaTracker::new(),
            balances: InternalBalances::new(),
            verifier: AlwaysValidSignatures,
            hook: NoopHook,
            amm: NoopAmm,
        }
    }

    fn ctx(&mut self, now: u64) -> OrderExecutionContext<'_> {
        OrderExecutionContext {
            domain_separator: B256::ZERO,
            current_block: 1,
            now,
            signature_verifier: &self.verifier,
            compose_hook: &mut self.hook,
            host_amm: &mut self.amm,
            nonces: &mut self.nonces,
            executed_orders: &mut self.executed,
            delta: &mut self.delta,
            balances: &mut self.balances,
        }
    }
}

#[test]
fn extra_fee_above_cap_is_rejected_before_any_settlement() {
    let mut harness = Harness::new();
    let mut order = base_order();
    order.extra_fee = 1_000; // exceeds extra_fee_cap = 100
    let pricing = pricing();
    let mut ctx = harness.ctx(0);
    let result = validate_and_settle_user_order(&mut ctx, &order, &pricing);
    assert_eq!(result, Err(AngstromError::ExtraFeeAboveMax));
    assert_eq!(ctx.delta.get(pricing.asset0), alloy_primitives::I256::ZERO);
}

#[test]
fn expired_standing_order_is_rejected() {
    let mut harness = Harness::new();
    let order = base_order(); // deadline = 100
    let pricing = pricing();
    let mut ctx = harness.ctx(200); // now > deadline
    assert_eq!(
        validate_and_settle_user_order(&mut ctx, &order, &pricing),
        Err(AngstromError::Expired)
    );
}

#[test]
fn min_price_violation_is_rejected() {
    let mut harness = Harness::new();
    let mut order = base_order();
    // Demand far more out than the 1:1 price could ever deliver.
    order.min_price = RAY.checked_mul(U256::from(1_000u64)).unwrap();
    let pricing = pricing();
    let mut ctx = harness.ctx(0);
    assert_eq!(
        validate_and_settle_user_order(&mut ctx, &order, &pricing),
        Err(AngstromError::PriceViolation)
    );
}

/// S6: nonce reuse within the same bundle is rejected before settlement,
/// and the delta tracker is left exactly as the first order's settlement
/// left it.
#[test]
fn nonce_reuse_leaves_delta_at_pre_order_state() {
    let mut harness = Harness::new();
    let order = base_order();
    let pricing = pricing();

    let (in_amount, out_amount) = {
        let mut ctx = harness.ctx(0);
        validate_and_settle_user_order(&mut ctx, &order, &pricing).unwrap()
    };
    let delta0_after_first = harness.delta.get(pricing.asset0);
    let delta1_after_first = harness.delta.get(pricing.asset1);
    assert_eq!(delta0_after_first, alloy_primitives::I256::try_from(in_amount).unwrap());
    assert_eq!(delta1_after_first, -alloy_primitives::I256::try_from(out_amount).unwrap());

    let mut second = base_order();
    second.signer = order.signer; // same signer, same nonce
    let mut ctx = harness.ctx(0);
    let result = validate_and_settle_user_order(&mut ctx, &second, &pricing);
    assert_eq!(result, Err(AngstromError::NonceReuse));
    assert_eq!(ctx.delta.get(pricing.asset0), delta0_after_first);
    assert_eq!(ctx.delta.get(pricing.asset1), delta1_after_first);
}

#[test]
fn partial_fill_below_minimum_is_rejected() {
    let mut harness = Harness::new();
    let mut order = base_order();
    order.quantity = OrderQuantity::Partial { min_in: 500, max_in: 1_000, filled_in: 100 };
    let pricing = pricing();
    let mut ctx = harness.ctx(0);
    assert_eq!(
        validate_and_settle_user_order(&mut ctx, &order, &pricing),
        Err(AngstromError::FillingTooLittle)
    );
}

#[test]
fn partial_fill_above_maximum_is_rejected() {
    let mut harness = Harness::new();
    let mut order = base_order();
    order.quantity = OrderQuantity::Partial { min_in: 100, max_in: 1_000, filled_in: 2_000 };
    let pricing = pricing();
    let mut ctx = harness.ctx(0);
    assert_eq!(
        validate_and_settle_user_order(&mut ctx, &order, &pricing),
        Err(AngstromError::FillingTooMuch)
    );
}
