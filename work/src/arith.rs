//! Wide integer helpers shared by the estimators.

use tracing::debug;

/// `a * b / divisor` in `u128`, with the divisor floored at one.
///
/// Exact whenever the true quotient fits; saturates at `u128::MAX`
/// otherwise.
pub fn mul_div(a: u128, b: u128, divisor: u128) -> u128 {
    let divisor = divisor.max(1);
    match a.checked_mul(b) {
        Some(product) => product / divisor,
        None => {
            debug!(a = %a, b = %b, divisor = %divisor, "product overflows, long multiplication");
            long_mul_div(a, b, divisor)
        }
    }
}

/// Shift-and-add multiplication of `a` by the bits of `b`, keeping the
/// running product as `quotient * divisor + rem` so nothing exceeds 128 bits.
fn long_mul_div(a: u128, b: u128, divisor: u128) -> u128 {
    let (whole, part) = (a / divisor, a % divisor);
    let mut quotient = 0u128;
    let mut rem = 0u128;
    for bit in (0..u128::BITS - b.leading_zeros()).rev() {
        quotient = quotient.saturating_mul(2);
        rem = add_rem(rem, rem, divisor, &mut quotient);
        if (b >> bit) & 1 == 1 {
            quotient = quotient.saturating_add(whole);
            rem = add_rem(rem, part, divisor, &mut quotient);
        }
    }
    quotient
}

/// `x + y` reduced below `divisor`, carrying into `quotient`. Both inputs
/// are already below `divisor`.
fn add_rem(x: u128, y: u128, divisor: u128, quotient: &mut u128) -> u128 {
    if x >= divisor - y {
        *quotient = quotient.saturating_add(1);
        x - (divisor - y)
    } else {
        x + y
    }
}
