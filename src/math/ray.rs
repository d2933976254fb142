//! Ray/wad math mirroring the lending pool's own fixed-point arithmetic.
//!
//! Every operation rounds half-up by adding `divisor / 2` before the integer
//! division, exactly as the pool contracts do. Ledger balances reconcile
//! against the protocol's accounting only if this matches bit-for-bit.

use primitive_types::{U256, U512};
use rust_decimal::Decimal;

use super::MathError;

/// 10^27, the scale of liquidity/borrow indices.
pub fn ray() -> U256 {
    U256::exp10(27)
}

/// 10^18, the common token-amount scale.
pub fn wad() -> U256 {
    U256::exp10(18)
}

/// 10^9, the ratio between the two scales.
fn wad_ray_ratio() -> U256 {
    U256::exp10(9)
}

/// Largest mantissa representable by `rust_decimal` (2^96 - 1).
const MAX_DECIMAL_MANTISSA: u128 = 79_228_162_514_264_337_593_543_950_335;

/// Largest fractional-digit count supported by `rust_decimal`.
const MAX_DECIMAL_SCALE: u32 = 28;

/// `round(a * b / RAY)`, computed through a 512-bit intermediate.
pub fn ray_mul(a: U256, b: U256) -> Result<U256, MathError> {
    let half = U512::from(ray()) / 2;
    let wide = a.full_mul(b) + half;
    U256::try_from(wide / U512::from(ray())).map_err(|_| MathError::Overflow("ray_mul"))
}

/// `round(a * RAY / b)`. A zero `b` is a configuration bug, not a data gap.
pub fn ray_div(a: U256, b: U256) -> Result<U256, MathError> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero("ray_div"));
    }
    let half = U512::from(b) / 2;
    let wide = a.full_mul(ray()) + half;
    U256::try_from(wide / U512::from(b)).map_err(|_| MathError::Overflow("ray_div"))
}

/// Drop a ray value to wad scale, rounding half-up at the 10^9 ratio.
pub fn ray_to_wad(a: U256) -> U256 {
    let ratio = U512::from(wad_ray_ratio());
    let wide = U512::from(a) + ratio / 2;
    // Scale only decreases, so the quotient always fits.
    U256::try_from(wide / ratio).expect("ray_to_wad quotient fits in 256 bits")
}

/// Lift a wad value to ray scale. Exact: the scale only increases.
pub fn wad_to_ray(a: U256) -> Result<U256, MathError> {
    a.checked_mul(wad_ray_ratio())
        .ok_or(MathError::Overflow("wad_to_ray"))
}

/// Convert an integer token amount to a decimal with `decimals` fractional
/// digits, for USD and display math.
///
/// `rust_decimal` carries 28 significant digits on a 96-bit mantissa, so the
/// least-significant digits of very large amounts are shed (they are beyond
/// representable precision either way). An amount whose *integer* part
/// exceeds the mantissa is malformed input and fails.
pub fn to_decimal(amount: U256, decimals: u32) -> Result<Decimal, MathError> {
    let ten = U256::from(10u8);
    let max_mantissa = U256::from(MAX_DECIMAL_MANTISSA);

    let mut digits = amount;
    let mut scale = decimals;
    while digits > max_mantissa {
        if scale == 0 {
            return Err(MathError::DecimalRange(amount.to_string()));
        }
        digits /= ten;
        scale -= 1;
    }
    while scale > MAX_DECIMAL_SCALE {
        digits /= ten;
        scale -= 1;
    }

    Ok(Decimal::from_i128_with_scale(digits.as_u128() as i128, scale))
}
