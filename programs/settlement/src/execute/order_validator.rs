//! Order Validation (§4.7): typed-data digests, the eight common per-order
//! checks, and the quantity/price arithmetic shared by every order variant.
//!
//! Two distinct fees are at play and must not be conflated: the pair's
//! `bundle-fee-in-microbips` is folded into the clearing price itself
//! (§4.7 step 5's closing paragraph), while an order's own `extra-fee` is a
//! flat quantity, always denominated in asset0, added or subtracted at
//! whichever leg of the trade is asset0 (§4.7 step 5, bullets 1-2). This
//! split is this crate's resolution of an otherwise underspecified
//! interaction between the two fee mechanisms.

use alloy_primitives::{Address, B256, U256};

use crate::error::{AngstromError, Result};
use crate::host::{ComposeHook, HostAmm, SignatureVerifier};
use crate::libraries::fixed_point::{MICROBIP_DENOMINATOR, RAY};
use crate::libraries::full_math::MulDiv;
use crate::states::delta::DeltaTracker;
use crate::states::balance::InternalBalances;
use crate::states::nonce::NonceBitmaps;
use crate::states::order::{OrderLifetime, OrderQuantity, Signature, TopOfBlockOrder, UserOrder};
use crate::typed_data::{self, DomainSeparator};

/// The pair, already resolved against the config store, in the shape the
/// order validator needs (§4.7).
pub struct OrderPricing {
    pub asset0: Address,
    pub asset1: Address,
    pub price_0_over_1: U256,
    pub price_1_over_0: U256,
    pub bundle_fee_microbips: u32,
}

pub struct OrderExecutionContext<'a> {
    pub domain_separator: B256,
    pub current_block: u64,
    pub now: u64,
    pub signature_verifier: &'a dyn SignatureVerifier,
    pub compose_hook: &'a mut dyn ComposeHook,
    pub host_amm: &'a mut dyn HostAmm,
    pub nonces: &'a mut NonceBitmaps,
    /// Keyed by `(signer, order-hash)`, not the hash alone: two different
    /// signers can produce a structurally identical order (§4.7 step 3).
    pub executed_orders: &'a mut ahash::AHashSet<(Address, B256)>,
    pub delta: &'a mut DeltaTracker,
    pub balances: &'a mut InternalBalances,
}

fn effective_price(price: U256, fee_microbips: u32) -> Result<U256> {
    let keep = (MICROBIP_DENOMINATOR as u32).saturating_sub(fee_microbips) as u64;
    price
        .mul_div_floor(U256::from(keep), U256::from(MICROBIP_DENOMINATOR))
        .ok_or(AngstromError::ArithmeticOverflowUnderflow)
}

fn scale_floor(amount: u128, ray_price: U256) -> Result<u128> {
    U256::from(amount)
        .mul_div_floor(ray_price, RAY)
        .and_then(|v| v.try_into().ok())
        .ok_or(AngstromError::ArithmeticOverflowUnderflow)
}

fn scale_ceil(amount: u128, ray_price: U256) -> Result<u128> {
    U256::from(amount)
        .mul_div_ceil(ray_price, RAY)
        .and_then(|v| v.try_into().ok())
        .ok_or(AngstromError::ArithmeticOverflowUnderflow)
}

/// `quantity-in`, `quantity-out` (§4.7 step 5).
fn compute_quantities(
    zero_for_one: bool,
    quantity: &OrderQuantity,
    pricing: &OrderPricing,
    extra_fee: u128,
) -> Result<(u128, u128)> {
    let eff_0_over_1 = effective_price(pricing.price_0_over_1, pricing.bundle_fee_microbips)?;
    let eff_1_over_0 = effective_price(pricing.price_1_over_0, pricing.bundle_fee_microbips)?;

    if zero_for_one {
        match *quantity {
            OrderQuantity::Exact { amount, exact_in: true } => {
                let in_after_fee = amount
                    .checked_sub(extra_fee)
                    .ok_or(AngstromError::ArithmeticOverflowUnderflow)?;
                let out = scale_floor(in_after_fee, eff_0_over_1)?;
                Ok((amount, out))
            }
            OrderQuantity::Exact { amount, exact_in: false } => {
                let in_pre_fee = scale_ceil(amount, eff_1_over_0)?;
                let in_total = in_pre_fee
                    .checked_add(extra_fee)
                    .ok_or(AngstromError::ArithmeticOverflowUnderflow)?;
                Ok((in_total, amount))
            }
            OrderQuantity::Partial { min_in, max_in, filled_in } => {
                if filled_in < min_in {
                    return Err(AngstromError::FillingTooLittle);
                }
                if filled_in > max_in {
                    return Err(AngstromError::FillingTooMuch);
                }
                let in_after_fee = filled_in
                    .checked_sub(extra_fee)
                    .ok_or(AngstromError::ArithmeticOverflowUnderflow)?;
                let out = scale_floor(in_after_fee, eff_0_over_1)?;
                Ok((filled_in, out))
            }
        }
    } else {
        match *quantity {
            OrderQuantity::Exact { amount, exact_in: true } => {
                let out_pre_fee = scale_floor(amount, eff_1_over_0)?;
                let out = out_pre_fee
                    .checked_sub(extra_fee)
                    .ok_or(AngstromError::ArithmeticOverflowUnderflow)?;
                Ok((amount, out))
            }
            OrderQuantity::Exact { amount, exact_in: false } => {
                let gross_out0 = amount
                    .checked_add(extra_fee)
                    .ok_or(AngstromError::ArithmeticOverflowUnderflow)?;
                let in_total = scale_ceil(gross_out0, eff_0_over_1)?;
                Ok((in_total, amount))
            }
            OrderQuantity::Partial { min_in, max_in, filled_in } => {
                if filled_in < min_in {
                    return Err(AngstromError::FillingTooLittle);
                }
                if filled_in > max_in {
                    return Err(AngstromError::FillingTooMuch);
                }
                let out_pre_fee = scale_floor(filled_in, eff_1_over_0)?;
                let out = out_pre_fee
                    .checked_sub(extra_fee)
                    .ok_or(AngstromError::ArithmeticOverflowUnderflow)?;
                Ok((filled_in, out))
            }
        }
    }
}

/// `out / in >= min-price`, cross-multiplied to avoid division (§4.7 step
/// 6). An overflowing cross-multiplication means `min_price` could never be
/// satisfied at this scale and is treated as a violation.
fn check_min_price(in_amount: u128, out_amount: u128, min_price: U256) -> Result<()> {
    let lhs = U256::from(out_amount).checked_mul(RAY).ok_or(AngstromError::PriceViolation)?;
    let rhs = min_price.checked_mul(U256::from(in_amount)).ok_or(AngstromError::PriceViolation)?;
    if lhs < rhs {
        return Err(AngstromError::PriceViolation);
    }
    Ok(())
}

fn verify_signature(
    verifier: &dyn SignatureVerifier,
    signer: Address,
    digest: B256,
    signature: &Signature,
) -> Result<()> {
    let ok = match signature {
        Signature::Ecdsa { v, r, s } => verifier.verify_ecdsa(signer, digest, *v, *r, *s)?,
        Signature::Contract { signer: sig_signer, payload } => {
            if *sig_signer != signer {
                return Err(AngstromError::InvalidSignature);
            }
            verifier.verify_contract_signature(signer, digest, payload)?
        }
    };
    if !ok {
        return Err(AngstromError::InvalidSignature);
    }
    Ok(())
}

/// Settle the two legs into the delta tracker, honoring `use-internal`
/// (§4.7 steps 7-8): `use_internal = true` settles against this core's own
/// `InternalBalances` ledger (no token movement); `use_internal = false`
/// calls out to the host AMM for a real transfer.
fn settle_legs(
    ctx: &mut OrderExecutionContext,
    signer: Address,
    recipient: Address,
    use_internal: bool,
    asset_in: Address,
    asset_out: Address,
    in_amount: u128,
    out_amount: u128,
) -> Result<()> {
    ctx.delta.add(asset_in, in_amount)?;
    if use_internal {
        ctx.balances.withdraw(signer, asset_in, in_amount)?;
    } else {
        ctx.host_amm.transfer_in(asset_in, signer, in_amount)?;
    }
    ctx.delta.sub(asset_out, out_amount)?;
    if use_internal {
        ctx.balances.deposit(recipient, asset_out, out_amount)?;
    } else {
        ctx.host_amm.transfer_out(asset_out, recipient, out_amount)?;
    }
    Ok(())
}

/// The common lifecycle checks shared by standing and flash orders (§4.7
/// steps 2-3): deadline/nonce for standing, block-binding and intra-bundle
/// replay protection for flash.
fn check_lifetime(
    ctx: &mut OrderExecutionContext,
    signer: Address,
    lifetime: OrderLifetime,
    order_hash: B256,
) -> Result<()> {
    match lifetime {
        OrderLifetime::Standing { nonce, deadline } => {
            if ctx.now > deadline {
                return Err(AngstromError::Expired);
            }
            ctx.nonces.use_nonce(signer, nonce)?;
        }
        OrderLifetime::Flash { valid_for_block } => {
            if valid_for_block != ctx.current_block {
                return Err(AngstromError::Expired);
            }
            if !ctx.executed_orders.insert((signer, order_hash)) {
                return Err(AngstromError::OrderAlreadyExecuted);
            }
        }
    }
    Ok(())
}

fn run_hook(ctx: &mut OrderExecutionContext, signer: Address, hook: &Option<(crate::states::order::Hook, Vec<u8>)>) -> Result<()> {
    if let Some((hook, payload)) = hook {
        let magic = ctx.compose_hook.compose(hook.address, signer, payload)?;
        tracing::debug!(signer = ?signer, hook = ?hook.address, "invoked composable hook");
        if magic != crate::host::HOOK_RETURN_MAGIC {
            return Err(AngstromError::InvalidHookReturn);
        }
    }
    Ok(())
}

/// Validates and settles one `UserOrder` end to end, returning the
/// `(asset, amount)` pair it debited from the AMM-facing delta on the input
/// leg — callers use this only for logging; settlement itself already
/// landed in `ctx.delta`.
pub fn validate_and_settle_user_order(
    ctx: &mut OrderExecutionContext,
    order: &UserOrder,
    pricing: &OrderPricing,
) -> Result<(u128, u128)> {
    if order.extra_fee > order.extra_fee_cap {
        return Err(AngstromError::ExtraFeeAboveMax);
    }

    let hook_hash = typed_data::hook_data_hash(
        order.hook.as_ref().map(|(h, payload)| (h.address, payload.as_slice())),
    );
    let is_flash = matches!(order.lifetime, OrderLifetime::Flash { .. });
    let (nonce_or_block, deadline) = match order.lifetime {
        OrderLifetime::Standing { nonce, deadline } => (nonce, Some(deadline)),
        OrderLifetime::Flash { valid_for_block } => (valid_for_block, None),
    };
    let struct_hash = match order.quantity {
        OrderQuantity::Exact { amount, exact_in } => typed_data::exact_user_order_struct_hash(
            is_flash,
            order.pair_index,
            order.zero_for_one,
            order.use_internal,
            order.min_price,
            order.recipient,
            hook_hash,
            order.extra_fee_cap,
            order.extra_fee,
            amount,
            exact_in,
            nonce_or_block,
            deadline,
        ),
        OrderQuantity::Partial { min_in, max_in, filled_in } => typed_data::partial_user_order_struct_hash(
            is_flash,
            order.pair_index,
            order.zero_for_one,
            order.use_internal,
            order.min_price,
            order.recipient,
            hook_hash,
            order.extra_fee_cap,
            order.extra_fee,
            min_in,
            max_in,
            filled_in,
            nonce_or_block,
            deadline,
        ),
    };
    let digest = typed_data::digest(ctx.domain_separator, struct_hash);

    verify_signature(ctx.signature_verifier, order.signer, digest, &order.signature)?;
    check_lifetime(ctx, order.signer, order.lifetime, digest)?;
    run_hook(ctx, order.signer, &order.hook)?;

    let (in_amount, out_amount) = compute_quantities(order.zero_for_one, &order.quantity, pricing, order.extra_fee)?;
    check_min_price(in_amount, out_amount, order.min_price)?;

    let (asset_in, asset_out) = if order.zero_for_one {
        (pricing.asset0, pricing.asset1)
    } else {
        (pricing.asset1, pricing.asset0)
    };
    let recipient = order.recipient.unwrap_or(order.signer);
    settle_legs(ctx, order.signer, recipient, order.use_internal, asset_in, asset_out, in_amount, out_amount)?;

    Ok((in_amount, out_amount))
}

/// Validates and settles one `TopOfBlockOrder` (§4.7 "Top-of-block orders"):
/// quantities arrive pre-computed rather than derived from price, and
/// `gas-used-asset0` funds the operator's `save` bucket on asset0.
pub fn validate_and_settle_top_of_block_order(
    ctx: &mut OrderExecutionContext,
    order: &TopOfBlockOrder,
    pricing: &OrderPricing,
) -> Result<()> {
    if order.gas_used_asset0 > order.max_gas_asset0 {
        return Err(AngstromError::GasAboveMax);
    }

    let struct_hash = typed_data::top_of_block_order_struct_hash(
        order.use_internal,
        order.quantity_in,
        order.quantity_out,
        order.max_gas_asset0,
        order.gas_used_asset0,
        order.pair_index,
        order.zero_for_one,
        order.recipient,
    );
    let digest = typed_data::digest(ctx.domain_separator, struct_hash);

    verify_signature(ctx.signature_verifier, order.signer, digest, &order.signature)?;
    if !ctx.executed_orders.insert((order.signer, digest)) {
        return Err(AngstromError::OrderAlreadyExecuted);
    }

    let (asset_in, asset_out) = if order.zero_for_one {
        (pricing.asset0, pricing.asset1)
    } else {
        (pricing.asset1, pricing.asset0)
    };
    let recipient = order.recipient.unwrap_or(order.signer);
    settle_legs(
        ctx,
        order.signer,
        recipient,
        order.use_internal,
        asset_in,
        asset_out,
        order.quantity_in,
        order.quantity_out,
    )?;

    // gas_used_asset0 funds the operator's save bucket on asset0, always,
    // regardless of swap direction (§4.7 "gas-used-asset0 funds the save
    // bucket of asset0").
    ctx.delta.add(pricing.asset0, order.gas_used_asset0)?;

    Ok(())
}

pub fn build_domain_separator(chain_id: u64, verifying_contract: Address) -> B256 {
    DomainSeparator { chain_id, verifying_contract }.hash()
}
