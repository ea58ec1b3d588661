//! Exponential family: EMA, ASERT and the template-time TSA.
//!
//! Each scales a reference difficulty by `e^(-(ST - T) / (T * tau))` through
//! the fixed-point primitive. Response speed is set by `tau` alone.

use retarget_types::{Difficulty, RetargetParams, Timestamp};
use tracing::debug;

use crate::algorithm::Algorithm;
use crate::error::EstimatorError;
use crate::estimator::{checked_params, window_index, DifficultyEstimator, RetargetRequest};
use crate::fixed_exp::scale_by_exp;
use crate::lwma::{unfloored_lwma1, LWMA1_CLAMP};
use crate::sanitize::{monotone_timestamps, solvetimes, SolvetimeBounds};

/// EMA interval ceiling, in multiples of T.
pub const EMA_CLAMP: u64 = 7;

/// `reference * e^((expected - measured) / (T * smoothing))`.
fn exponential_step(reference: u64, expected: u128, measured: u128, t: u64, smoothing: u64) -> u128 {
    let expected = i128::try_from(expected).unwrap_or(i128::MAX);
    let measured = i128::try_from(measured).unwrap_or(i128::MAX);
    let numerator = expected.saturating_sub(measured);
    let denominator = u128::from(t) * u128::from(smoothing);
    scale_by_exp(reference, numerator, denominator)
}

/// Exponential moving average driven by the newest solvetime.
#[derive(Clone, Debug)]
pub struct Ema {
    params: RetargetParams,
}

impl Ema {
    pub fn new(params: RetargetParams) -> Result<Self, EstimatorError> {
        let params = checked_params(Algorithm::Ema, params, 1)?;
        Ok(Self { params })
    }
}

impl DifficultyEstimator for Ema {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Ema
    }

    fn params(&self) -> &RetargetParams {
        &self.params
    }

    fn estimate(&self, request: &RetargetRequest<'_>) -> Result<Difficulty, EstimatorError> {
        let t = self.params.target_interval;
        let bounds = SolvetimeBounds::up_to_multiple(t, EMA_CLAMP);
        let window = request.full_window(&self.params)?;
        let st = solvetimes(window.timestamps(), bounds)
            .last()
            .copied()
            .unwrap_or(t);
        let next = exponential_step(
            window.last_difficulty(),
            u128::from(t),
            u128::from(st),
            t,
            self.params.smoothing_blocks(),
        );
        Ok(Difficulty::from_wide(next))
    }
}

/// Absolutely scheduled exponential retarget anchored at the window's
/// first block.
///
/// The anchor moves with the window, so this is ASERT evaluated over N
/// blocks rather than from a fixed activation block.
#[derive(Clone, Debug)]
pub struct Asert {
    params: RetargetParams,
}

impl Asert {
    pub fn new(params: RetargetParams) -> Result<Self, EstimatorError> {
        let params = checked_params(Algorithm::Asert, params, 1)?;
        Ok(Self { params })
    }
}

impl DifficultyEstimator for Asert {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Asert
    }

    fn params(&self) -> &RetargetParams {
        &self.params
    }

    fn estimate(&self, request: &RetargetRequest<'_>) -> Result<Difficulty, EstimatorError> {
        let n = window_index(&self.params);
        let t = self.params.target_interval;
        let window = request.full_window(&self.params)?;
        let ts = monotone_timestamps(window.timestamps());
        let elapsed = u128::from(ts[n] - ts[0]);
        let scheduled = u128::from(t) * u128::from(self.params.window_size);
        let next = exponential_step(
            window.block_difficulty(1),
            scheduled,
            elapsed,
            t,
            self.params.smoothing_blocks(),
        );
        Ok(Difficulty::from_wide(next))
    }
}

/// Template-time adjustment on top of LWMA-1.
///
/// The LWMA-1 estimate for the next block is lowered as the template's
/// time moves past the newest block: a miner that keeps hashing on a stale
/// template sees its difficulty fall. The wait is floored at one second
/// after the newest timestamp and capped at 6T, so the result is bounded
/// and non-increasing as the template time advances.
#[derive(Clone, Debug)]
pub struct Tsa {
    params: RetargetParams,
}

impl Tsa {
    pub fn new(params: RetargetParams) -> Result<Self, EstimatorError> {
        let params = checked_params(Algorithm::Tsa, params, 1)?;
        Ok(Self { params })
    }

    /// Seconds between the newest block and the template, within `[1, 6T]`.
    fn template_elapsed(&self, newest: u64, template_time: Timestamp) -> u64 {
        let floor = newest.saturating_add(1);
        let at = if template_time.as_secs() < floor {
            debug!(
                template_time = template_time.as_secs(),
                newest,
                "template time floored after newest block"
            );
            floor
        } else {
            template_time.as_secs()
        };
        let cap = LWMA1_CLAMP.saturating_mul(self.params.target_interval);
        (at - newest).clamp(1, cap.max(1))
    }
}

impl DifficultyEstimator for Tsa {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Tsa
    }

    fn params(&self) -> &RetargetParams {
        &self.params
    }

    fn estimate(&self, request: &RetargetRequest<'_>) -> Result<Difficulty, EstimatorError> {
        let template_time = request
            .template_time
            .ok_or(EstimatorError::MissingTemplateTime)?;
        let n = window_index(&self.params);
        let t = self.params.target_interval;
        let window = request.full_window(&self.params)?;

        let (baseline, sum_st) = unfloored_lwma1(&self.params, window);
        let baseline = u64::try_from(baseline).unwrap_or(u64::MAX).max(1);

        let ts = monotone_timestamps(window.timestamps());
        let elapsed = u128::from(self.template_elapsed(ts[n], template_time));
        // Scale the wait by how fast the window ran relative to schedule.
        let scheduled = u128::from(t) * u128::from(self.params.window_size);
        let elapsed = (elapsed * sum_st / scheduled).max(1);

        let next = exponential_step(
            baseline,
            u128::from(t),
            elapsed,
            t,
            self.params.template_smoothing,
        );
        Ok(Difficulty::from_wide(next))
    }
}
