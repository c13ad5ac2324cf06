//! Overflow-resistant multiply-divide, widening through a 512-bit
//! intermediate so that `val * num` never silently wraps before the
//! division narrows it back down (§9 "a widened 256-bit multiply-then-shift
//! is required").
//!
//! The teacher crate did this with a hand-rolled `U512` built on the `uint`
//! crate; here the widening type comes from `ruint` (the crate
//! `alloy_primitives::U256` itself is built on) instead, since this crate
//! already speaks `alloy_primitives` for every other big integer.

use alloy_primitives::U256;
use ruint::Uint;

pub type U512 = Uint<512, 8>;

fn widen(x: U256) -> U512 {
    let limbs = x.as_limbs();
    U512::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3], 0, 0, 0, 0])
}

fn narrow(x: U512) -> Option<U256> {
    let limbs = x.as_limbs();
    if limbs[4] != 0 || limbs[5] != 0 || limbs[6] != 0 || limbs[7] != 0 {
        return None;
    }
    Some(U256::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3]]))
}

/// `val * num / denom` with floor or ceiling rounding and no phantom
/// overflow: the multiplication is carried out at double width before the
/// division narrows the result back to `Self`.
pub trait MulDiv<RHS = Self> {
    type Output;

    fn mul_div_floor(self, num: RHS, denom: RHS) -> Option<Self::Output>;
    fn mul_div_ceil(self, num: RHS, denom: RHS) -> Option<Self::Output>;
}

impl MulDiv for U256 {
    type Output = U256;

    fn mul_div_floor(self, num: Self, denom: Self) -> Option<Self::Output> {
        if denom.is_zero() {
            return None;
        }
        let r = (widen(self) * widen(num)) / widen(denom);
        narrow(r)
    }

    fn mul_div_ceil(self, num: Self, denom: Self) -> Option<Self::Output> {
        if denom.is_zero() {
            return None;
        }
        let numerator = widen(self) * widen(num);
        let d = widen(denom);
        let r = (numerator + d - U512::from(1)) / d;
        narrow(r)
    }
}

impl MulDiv for u128 {
    type Output = u128;

    fn mul_div_floor(self, num: Self, denom: Self) -> Option<Self::Output> {
        U256::from(self)
            .mul_div_floor(U256::from(num), U256::from(denom))?
            .try_into()
            .ok()
    }

    fn mul_div_ceil(self, num: Self, denom: Self) -> Option<Self::Output> {
        U256::from(self)
            .mul_div_ceil(U256::from(num), U256::from(denom))?
            .try_into()
            .ok()
    }
}

/// `val * 2^128 / denom`, floor rounding, used for reward-growth
/// accumulation (§4.5, §4.6).
pub fn mul_x128_div_floor(val: u128, denom: u128) -> Option<U256> {
    U256::from(val).mul_div_floor(crate::libraries::fixed_point::X128, U256::from(denom))
}

/// `(val * liquidity) >> 128` with saturation, used when crediting a
/// position's owed reward on remove-liquidity (§4.6: "256-bit multiply then
/// right-shift 128 with saturation").
pub fn full_mul_x128_saturating(growth_delta: U256, liquidity: u128) -> u128 {
    let product = widen(growth_delta) * widen(U256::from(liquidity));
    let shifted = product >> 128;
    match narrow(shifted) {
        Some(v) => v.try_into().unwrap_or(u128::MAX),
        None => u128::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{quickcheck, Arbitrary, Gen};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct NonZeroU128(u128);

    impl Arbitrary for NonZeroU128 {
        fn arbitrary<G: Gen>(g: &mut G) -> Self {
            loop {
                let v = u128::arbitrary(g);
                if v != 0 {
                    return NonZeroU128(v);
                }
            }
        }
    }

    quickcheck! {
        fn floor_matches_u256_math(val: u128, num: u128, den: NonZeroU128) -> bool {
            let res = val.mul_div_floor(num, den.0);
            let expected = U256::from(val) * U256::from(num) / U256::from(den.0);
            res == Some(expected.try_into().unwrap())
        }
    }

    quickcheck! {
        fn ceil_is_floor_or_floor_plus_one(val: u128, num: u128, den: NonZeroU128) -> bool {
            let floor = val.mul_div_floor(num, den.0).unwrap();
            let ceil = val.mul_div_ceil(num, den.0).unwrap();
            let exact = (val as u128).checked_mul(num).map(|p| p % den.0 == 0);
            match exact {
                Some(true) => ceil == floor,
                _ => ceil == floor + 1 || ceil == floor, // floor may already equal ceil at the boundary
            }
        }
    }

    #[test]
    fn mul_div_does_not_overflow_u256() {
        let r = U256::MAX.mul_div_floor(U256::from(2u8), U256::from(2u8));
        assert_eq!(r, Some(U256::MAX));
    }

    #[test]
    fn denominator_zero_returns_none() {
        assert_eq!(100u128.mul_div_floor(1, 0), None);
    }
}
