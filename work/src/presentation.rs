//! Optional human-readable shaping of an estimate.
//!
//! Some networks publish difficulties with only a few significant digits
//! and use the freed low digits to show the recent average solvetime. Both
//! rules run after the estimator and are off unless configured.

use retarget_types::{BlockWindow, Difficulty, RetargetParams};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithm::Algorithm;
use crate::error::EstimatorError;
use crate::estimator::{DifficultyEstimator, RetargetRequest};
use crate::sanitize::monotone_timestamps;

/// Significant digits kept by [`Presentation::round_insignificant_digits`].
const SIGNIFICANT_DIGITS_FACTOR: u64 = 100;
/// Estimates at or below this keep their low digits.
const EMBED_THRESHOLD: u64 = 100_000;
/// Solvetimes averaged into the low digits.
const EMBED_BLOCKS: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Presentation {
    /// Keep three significant digits, rounding half up.
    pub round_insignificant_digits: bool,
    /// Replace the lowest three digits of large estimates with the mean of
    /// the last ten solvetimes, capped at 999.
    pub embed_recent_solvetime: bool,
}

impl Presentation {
    pub fn is_enabled(&self) -> bool {
        self.round_insignificant_digits || self.embed_recent_solvetime
    }

    pub fn apply(&self, estimate: Difficulty, window: &BlockWindow) -> Difficulty {
        let mut value = estimate.get();
        if self.round_insignificant_digits {
            value = round_to_significant(value);
        }
        if self.embed_recent_solvetime && value > EMBED_THRESHOLD {
            let rounded = round_to_unit(value, 1_000);
            value = rounded.saturating_add(recent_mean_solvetime(window).min(999));
        }
        Difficulty::floored(value)
    }
}

fn round_to_significant(value: u64) -> u64 {
    let mut unit = 100_000_000_000_000_000u64;
    while unit > 1 {
        if value > unit.saturating_mul(SIGNIFICANT_DIGITS_FACTOR) {
            return round_to_unit(value, unit);
        }
        unit /= 10;
    }
    value
}

/// Nearest multiple of `unit`, halves up. Falls back to the multiple below
/// when the one above is past `u64::MAX`.
fn round_to_unit(value: u64, unit: u64) -> u64 {
    let (value, unit) = (u128::from(value), u128::from(unit));
    let nearest = (value + unit / 2) / unit * unit;
    u64::try_from(nearest).unwrap_or_else(|_| {
        debug!(value = %value, unit = %unit, "rounding up overflows, rounding down");
        (value / unit * unit) as u64
    })
}

/// Mean of the last ten sanitized solvetimes, or of all of them in a
/// shorter window.
fn recent_mean_solvetime(window: &BlockWindow) -> u64 {
    let ts = monotone_timestamps(window.timestamps());
    let newest = ts.len().saturating_sub(1);
    let count = EMBED_BLOCKS.min(newest);
    if count == 0 {
        return 0;
    }
    (ts[newest] - ts[newest - count]) / count as u64
}

/// An estimator whose results pass through a [`Presentation`].
///
/// Bootstrap guesses are returned untouched.
pub struct Presented<E> {
    inner: E,
    presentation: Presentation,
}

impl<E: DifficultyEstimator> Presented<E> {
    pub fn new(inner: E, presentation: Presentation) -> Self {
        Self {
            inner,
            presentation,
        }
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: DifficultyEstimator> DifficultyEstimator for Presented<E> {
    fn algorithm(&self) -> Algorithm {
        self.inner.algorithm()
    }

    fn params(&self) -> &RetargetParams {
        self.inner.params()
    }

    fn estimate(&self, request: &RetargetRequest<'_>) -> Result<Difficulty, EstimatorError> {
        let estimate = self.inner.estimate(request)?;
        Ok(self.presentation.apply(estimate, request.window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lwma::Lwma1;
    use crate::testing::{request_at, steady_window, window_with_solvetimes};

    const ROUND: Presentation = Presentation {
        round_insignificant_digits: true,
        embed_recent_solvetime: false,
    };
    const EMBED: Presentation = Presentation {
        round_insignificant_digits: false,
        embed_recent_solvetime: true,
    };

    #[test]
    fn keeps_three_significant_digits() {
        assert_eq!(round_to_significant(123_456_789), 123_000_000);
        assert_eq!(round_to_significant(987_654), 988_000);
        assert_eq!(round_to_significant(100), 100);
        assert_eq!(round_to_significant(1_001), 1_000);
        assert_eq!(round_to_significant(7), 7);
    }

    #[test]
    fn twenty_digit_values_keep_three_digits() {
        assert_eq!(round_to_significant(12_345_678_901_234_567_890), 12_300_000_000_000_000_000);
        assert_eq!(round_to_significant(18_351_000_000_000_000_000), 18_400_000_000_000_000_000);
        assert_eq!(round_to_significant(u64::MAX), 18_400_000_000_000_000_000);
    }

    #[test]
    fn rounding_past_the_top_falls_back_down() {
        assert_eq!(round_to_unit(u64::MAX, 1_000), 18_446_744_073_709_551_000);
        assert_eq!(round_to_unit(u64::MAX, 10_000_000_000_000_000), 18_440_000_000_000_000_000);
        assert_eq!(round_to_unit(18_446_744_073_709_550_500, 1_000), 18_446_744_073_709_551_000);
        assert_eq!(round_to_unit(1_499, 1_000), 1_000);
        assert_eq!(round_to_unit(1_500, 1_000), 2_000);
    }

    #[test]
    fn embedding_near_the_top_does_not_wrap() {
        let w = window_with_solvetimes(&[125; 20], 1_000);
        let shaped = EMBED.apply(Difficulty::floored(u64::MAX), &w);
        assert_eq!(shaped.get(), 18_446_744_073_709_551_125);
    }

    #[test]
    fn embeds_recent_solvetime_in_low_digits() {
        let w = window_with_solvetimes(&[125; 20], 1_000);
        let shaped = EMBED.apply(Difficulty::floored(4_567_891), &w);
        assert_eq!(shaped.get(), 4_568_125);
    }

    #[test]
    fn small_estimates_are_not_embedded() {
        let w = window_with_solvetimes(&[125; 20], 1_000);
        assert_eq!(EMBED.apply(Difficulty::floored(99_999), &w).get(), 99_999);
    }

    #[test]
    fn embedded_solvetime_is_capped() {
        let w = window_with_solvetimes(&[5_000; 12], 1_000);
        assert_eq!(EMBED.apply(Difficulty::floored(2_000_000), &w).get(), 2_000_999);
    }

    #[test]
    fn disabled_presentation_is_identity() {
        let w = steady_window(10, 120, 1_000);
        let off = Presentation::default();
        assert!(!off.is_enabled());
        assert_eq!(off.apply(Difficulty::floored(123_456), &w).get(), 123_456);
    }

    #[test]
    fn wrapper_shapes_estimates_but_not_guesses() {
        let params = RetargetParams::new(120, 30).with_difficulty_guess(123_456);
        let lwma = Presented::new(Lwma1::new(params).unwrap(), ROUND);
        let w = steady_window(30, 120, 123_456);
        let guess = lwma.next_difficulty(&request_at(&w, 5)).unwrap();
        assert_eq!(guess.get(), 123_456);
        let estimate = lwma.next_difficulty(&request_at(&w, 100)).unwrap();
        assert_eq!(estimate.get() % 1_000, 0);
    }
}
