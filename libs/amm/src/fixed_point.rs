//! WAD fixed-point arithmetic over 256-bit unsigned integers
//!
//! Ratios and fractional multipliers are represented as integers scaled by
//! 10^18 ("WAD"). Every product that feeds a division is computed in 512 bits
//! and narrowed back afterwards, so an intermediate can never wrap silently:
//! either the final value fits in 256 bits or the call fails with
//! [`AmmError::ArithmeticOverflow`].
//!
//! ## Rounding
//!
//! - [`w_div`] and [`w_mul`] round half up
//! - [`round_to_nearest`] rounds half up to a multiple of `n`
//! - [`mul_div`] floors, which always favours the pool
//! - [`mul_div_round`] rounds half up, the same rule as [`w_div`]
//! - [`mul_div_ceil`] rounds up, for reserves that must not be understated

use crate::errors::{AmmError, AmmResult};
use elastic_config::BASIS_POINTS;
use ethereum_types::{U256, U512};

/// 10^18
pub const WAD: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);

/// WAD / 2, the round-half-up offset for [`w_mul`]
pub const HALF_WAD: U256 = U256([500_000_000_000_000_000, 0, 0, 0]);

#[inline]
fn widen(value: U256) -> U512 {
    let U256(words) = value;
    U512([words[0], words[1], words[2], words[3], 0, 0, 0, 0])
}

#[inline]
fn narrow(value: U512, op: &'static str) -> AmmResult<U256> {
    let U512(words) = value;
    if words[4..].iter().any(|word| *word != 0) {
        return Err(AmmError::ArithmeticOverflow(op));
    }
    Ok(U256([words[0], words[1], words[2], words[3]]))
}

/// `(a * WAD + b / 2) / b`
pub fn w_div(a: U256, b: U256) -> AmmResult<U256> {
    if b.is_zero() {
        return Err(AmmError::DivisionByZero);
    }
    let numerator = widen(a) * widen(WAD) + widen(b / 2);
    narrow(numerator / widen(b), "w_div")
}

/// `(a * b + WAD / 2) / WAD`
pub fn w_mul(a: U256, b: U256) -> AmmResult<U256> {
    let numerator = widen(a) * widen(b) + widen(HALF_WAD);
    narrow(numerator / widen(WAD), "w_mul")
}

/// Round `a` to the nearest multiple of `n`, halves rounding up
pub fn round_to_nearest(a: U256, n: U256) -> AmmResult<U256> {
    if n.is_zero() {
        return Err(AmmError::DivisionByZero);
    }
    let wide_n = widen(n);
    let multiples = (widen(a) + widen(n / 2)) / wide_n;
    narrow(multiples * wide_n, "round_to_nearest")
}

/// Unsigned absolute difference
#[inline]
pub fn abs_diff(a: U256, b: U256) -> U256 {
    if a >= b {
        a - b
    } else {
        b - a
    }
}

/// `floor(a * b / c)` with a 512-bit intermediate
pub fn mul_div(a: U256, b: U256, c: U256) -> AmmResult<U256> {
    if c.is_zero() {
        return Err(AmmError::DivisionByZero);
    }
    narrow(widen(a) * widen(b) / widen(c), "mul_div")
}

/// `a * b / c` rounded half up, with a 512-bit intermediate
///
/// Converts a quantity between assets at the exact reserve ratio instead of
/// through a WAD-rounded price.
pub fn mul_div_round(a: U256, b: U256, c: U256) -> AmmResult<U256> {
    if c.is_zero() {
        return Err(AmmError::DivisionByZero);
    }
    let numerator = widen(a) * widen(b) + widen(c / 2);
    narrow(numerator / widen(c), "mul_div_round")
}

/// `ceil(a * b / c)` with a 512-bit intermediate
pub fn mul_div_ceil(a: U256, b: U256, c: U256) -> AmmResult<U256> {
    if c.is_zero() {
        return Err(AmmError::DivisionByZero);
    }
    let wide_c = widen(c);
    narrow((widen(a) * widen(b) + wide_c - U512::one()) / wide_c, "mul_div_ceil")
}

/// Checked 256-bit product
pub fn checked_mul(a: U256, b: U256, op: &'static str) -> AmmResult<U256> {
    a.checked_mul(b).ok_or(AmmError::ArithmeticOverflow(op))
}

/// Checked 256-bit sum
pub fn checked_add(a: U256, b: U256, op: &'static str) -> AmmResult<U256> {
    a.checked_add(b).ok_or(AmmError::ArithmeticOverflow(op))
}

/// `amount * (10000 - fee_bps)`, the fee-adjusted input scaled by basis points
pub fn less_fee_scaled(amount: U256, fee_bps: u32) -> AmmResult<U256> {
    if fee_bps >= BASIS_POINTS {
        return Err(AmmError::InvalidFee { fee_bps });
    }
    checked_mul(amount, U256::from(BASIS_POINTS - fee_bps), "fee adjustment")
}

#[cfg(test)]
mod tests {
    use super::*;
    use elastic_config::WAD_DECIMALS;

    fn wad(n: u64) -> U256 {
        U256::from(n) * WAD
    }

    #[test]
    fn test_wad_constants() {
        assert_eq!(WAD, U256::exp10(WAD_DECIMALS));
        assert_eq!(HALF_WAD + HALF_WAD, WAD);
    }

    #[test]
    fn test_w_div_rounds_half_up() {
        assert_eq!(w_div(U256::from(1), U256::from(2)).unwrap(), WAD / 2);
        // 2/3 = 0.666..67 at WAD precision
        assert_eq!(
            w_div(U256::from(2), U256::from(3)).unwrap(),
            U256::from(666_666_666_666_666_667u64)
        );
        // 1/3 = 0.333..33, the half-up offset is not enough to bump it
        assert_eq!(
            w_div(U256::from(1), U256::from(3)).unwrap(),
            U256::from(333_333_333_333_333_333u64)
        );
    }

    #[test]
    fn test_w_div_by_zero() {
        assert_eq!(
            w_div(U256::from(1), U256::zero()),
            Err(AmmError::DivisionByZero)
        );
    }

    #[test]
    fn test_w_div_does_not_overflow_on_wide_intermediate() {
        // a * WAD exceeds 256 bits but the quotient fits
        let a = U256::MAX / 2;
        assert_eq!(w_div(a, WAD).unwrap(), a);
        assert_eq!(
            w_div(U256::MAX, U256::one()),
            Err(AmmError::ArithmeticOverflow("w_div"))
        );
    }

    #[test]
    fn test_w_mul() {
        assert_eq!(w_mul(wad(3), wad(4)).unwrap(), wad(12));
        // 0.5e-18 rounds up to 1e-18
        assert_eq!(w_mul(U256::one(), HALF_WAD).unwrap(), U256::one());
        // 0.4e-18 rounds down
        assert_eq!(
            w_mul(U256::one(), U256::from(400_000_000_000_000_000u64)).unwrap(),
            U256::zero()
        );
        assert_eq!(
            w_mul(U256::MAX, wad(2)),
            Err(AmmError::ArithmeticOverflow("w_mul"))
        );
    }

    #[test]
    fn test_round_to_nearest() {
        assert_eq!(
            round_to_nearest(U256::from(149), U256::from(100)).unwrap(),
            U256::from(100)
        );
        assert_eq!(
            round_to_nearest(U256::from(150), U256::from(100)).unwrap(),
            U256::from(200)
        );
        assert_eq!(
            round_to_nearest(U256::from(7), U256::zero()),
            Err(AmmError::DivisionByZero)
        );
    }

    #[test]
    fn test_round_to_wad_matches_w_mul() {
        let qty = U256::from(123_456_789u64);
        let ratio = U256::from(987_654_321_987_654_321u64);
        let rounded = round_to_nearest(qty * ratio, WAD).unwrap() / WAD;
        assert_eq!(rounded, w_mul(qty, ratio).unwrap());
    }

    #[test]
    fn test_abs_diff() {
        assert_eq!(abs_diff(U256::from(3), U256::from(10)), U256::from(7));
        assert_eq!(abs_diff(U256::from(10), U256::from(3)), U256::from(7));
        assert_eq!(abs_diff(U256::MAX, U256::MAX), U256::zero());
    }

    #[test]
    fn test_mul_div_floors() {
        assert_eq!(
            mul_div(U256::from(10), U256::from(10), U256::from(3)).unwrap(),
            U256::from(33)
        );
        // Intermediate beyond 256 bits
        assert_eq!(
            mul_div(U256::MAX, U256::from(6), U256::from(6)).unwrap(),
            U256::MAX
        );
        assert_eq!(
            mul_div(U256::one(), U256::one(), U256::zero()),
            Err(AmmError::DivisionByZero)
        );
    }

    #[test]
    fn test_mul_div_round_and_ceil() {
        // 10 * 10 / 3 = 33.33..
        assert_eq!(
            mul_div_round(U256::from(10), U256::from(10), U256::from(3)).unwrap(),
            U256::from(33)
        );
        assert_eq!(
            mul_div_ceil(U256::from(10), U256::from(10), U256::from(3)).unwrap(),
            U256::from(34)
        );
        // 3 * 1 / 2 = 1.5 rounds up, exact quotients are left alone
        assert_eq!(
            mul_div_round(U256::from(3), U256::one(), U256::from(2)).unwrap(),
            U256::from(2)
        );
        assert_eq!(
            mul_div_ceil(U256::from(12), U256::from(10), U256::from(3)).unwrap(),
            U256::from(40)
        );
        // Ratios far below 1e-18 keep full precision
        let tiny = mul_div_round(U256::exp10(6), U256::exp10(25), U256::exp10(6)).unwrap();
        assert_eq!(tiny, U256::exp10(25));
        assert_eq!(
            mul_div_ceil(U256::one(), U256::one(), U256::zero()),
            Err(AmmError::DivisionByZero)
        );
    }

    #[test]
    fn test_less_fee_scaled() {
        assert_eq!(
            less_fee_scaled(U256::from(1000), 30).unwrap(),
            U256::from(9_970_000)
        );
        assert_eq!(
            less_fee_scaled(U256::from(1), 10_000),
            Err(AmmError::InvalidFee { fee_bps: 10_000 })
        );
    }
}
