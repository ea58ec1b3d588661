//! Fixed-point exponential.
//!
//! Every node must derive the same difficulty from the same window, so the
//! exponential family never touches floating point. `exp_scaled(x)` returns
//! `round(EXP_SCALE * e^(x / EXP_SCALE))` using a table of whole powers of e
//! and a Horner-form Taylor polynomial for the fractional part.

use crate::arith::mul_div;
use crate::error::EstimatorError;

/// Fixed-point scale of both the argument and the result.
pub const EXP_SCALE: u64 = 10_000;

/// `round(EXP_SCALE * e^k)` for k = 0..=24.
pub const EXP_TABLE: [u64; 25] = [
    10_000,
    27_183,
    73_891,
    200_855,
    545_982,
    1_484_132,
    4_034_288,
    10_966_332,
    29_809_580,
    81_030_839,
    220_264_658,
    598_741_417,
    1_627_547_914,
    4_424_133_920,
    12_026_042_842,
    32_690_173_725,
    88_861_105_205,
    241_549_527_536,
    656_599_691_373,
    1_784_823_009_632,
    4_851_651_954_098,
    13_188_157_344_832,
    35_849_128_461_316,
    97_448_034_462_489,
    264_891_221_298_435,
];

/// Largest scaled argument inside the table's domain (24.9999).
pub const MAX_EXPONENT_SCALED: u64 = EXP_TABLE.len() as u64 * EXP_SCALE - 1;

/// Internal precision of the fractional polynomial.
const POLY_ONE: u128 = 1_000_000_000_000;

/// Taylor terms for e^f with f in [0, 1); the remainder is below 1e-9.
const POLY_TERMS: u128 = 12;

/// `round(EXP_SCALE * e^(x / EXP_SCALE))`.
///
/// Arguments past [`MAX_EXPONENT_SCALED`] saturate at the top of the domain,
/// so the result is non-decreasing in `x` over all of `u64`.
pub fn exp_scaled(x: u64) -> u64 {
    let x = x.min(MAX_EXPONENT_SCALED);
    let whole = (x / EXP_SCALE) as usize;
    let frac = u128::from(x % EXP_SCALE);

    // 1 + f(1 + f/2(1 + f/3(1 + ...))), innermost term first.
    let scale = u128::from(EXP_SCALE);
    let mut acc = POLY_ONE;
    for n in (1..=POLY_TERMS).rev() {
        acc = POLY_ONE + acc * frac / (scale * n);
    }

    let base = u128::from(EXP_TABLE[whole]);
    // base < 2^49 and acc < 2^42, so the product fits comfortably.
    ((base * acc + POLY_ONE / 2) / POLY_ONE) as u64
}

/// Like [`exp_scaled`] but rejects arguments outside the table.
pub fn checked_exp_scaled(x: u64) -> Result<u64, EstimatorError> {
    if x > MAX_EXPONENT_SCALED {
        return Err(EstimatorError::ExponentOutOfRange { scaled: x });
    }
    Ok(exp_scaled(x))
}

/// Scale an exponent `numerator / denominator` into fixed point, rounding
/// half up and saturating at the table ceiling.
fn scaled_exponent(magnitude: u128, denominator: u128) -> u64 {
    let denominator = denominator.max(1);
    let scaled = magnitude
        .saturating_mul(u128::from(EXP_SCALE))
        .saturating_add(denominator / 2)
        / denominator;
    u64::try_from(scaled)
        .unwrap_or(u64::MAX)
        .min(MAX_EXPONENT_SCALED)
}

/// `value * e^(numerator / denominator)` in integer arithmetic.
///
/// The exponent saturates at ±24.9999. A negative exponent divides by the
/// table value, which keeps both directions symmetric in rounding.
pub fn scale_by_exp(value: u64, numerator: i128, denominator: u128) -> u128 {
    let x = scaled_exponent(numerator.unsigned_abs(), denominator);
    let factor = u128::from(exp_scaled(x));
    let value = u128::from(value);
    let scale = u128::from(EXP_SCALE);
    if numerator >= 0 {
        mul_div(value, factor, scale)
    } else {
        mul_div(value, scale, factor)
    }
}
