//! Linearly weighted members of the linear family.
//!
//! Solvetime `i` (1 = oldest, N = newest) carries weight `i`, so the most
//! recent blocks dominate while the whole window still damps noise. With
//! `L = sum(i * ST_i)` and `k = N(N+1)/2`, the estimate is
//! `avg_D * T * k / L` scaled by a small correction factor.

use retarget_types::{BlockWindow, Difficulty, RetargetParams};
use tracing::debug;

use crate::algorithm::Algorithm;
use crate::arith::mul_div;
use crate::error::EstimatorError;
use crate::estimator::{checked_params, window_index, DifficultyEstimator, RetargetRequest};
use crate::sanitize::{monotone_timestamps, solvetimes, SolvetimeBounds};

/// Interval ceiling of LWMA-1 and WHR, in multiples of T.
pub const LWMA1_CLAMP: u64 = 6;
/// Interval ceiling of LWMA-4, in multiples of T.
pub const LWMA4_CLAMP: u64 = 5;

/// `max(L, N^2 T / 20, 1)`: a burst of fast blocks can't collapse the divisor.
fn floored_weighted_time(weighted: u128, params: &RetargetParams) -> u128 {
    let n = u128::from(params.window_size);
    let floor = (n * n * u128::from(params.target_interval) / 20).max(1);
    if weighted < floor {
        debug!(weighted = %weighted, floor = %floor, "weighted solvetime floored");
        floor
    } else {
        weighted
    }
}

/// `avg_D * N(N+1) T * factor / (200 L)`.
fn weighted_estimate(avg_d: u64, weighted: u128, params: &RetargetParams, factor: u128) -> u128 {
    let n = u128::from(params.window_size);
    let numerator = n * (n + 1) * u128::from(params.target_interval) * factor;
    mul_div(u128::from(avg_d), numerator, 200 * weighted)
}

/// `(L, sum ST)` over `window` with intervals clamped to `[1, 6T]`.
fn lwma1_weighted_time(params: &RetargetParams, window: &BlockWindow) -> (u128, u128) {
    let bounds = SolvetimeBounds::up_to_multiple(params.target_interval, LWMA1_CLAMP);
    let sts = solvetimes(window.timestamps(), bounds);
    sts.iter()
        .zip(1u128..)
        .fold((0u128, 0u128), |(weighted, sum), (&st, i)| {
            (weighted + i * u128::from(st), sum + u128::from(st))
        })
}

/// LWMA-1 without the weighted-time floor, as the template-time estimator
/// uses it: the estimate and the plain sum of the clamped solvetimes.
pub(crate) fn unfloored_lwma1(params: &RetargetParams, window: &BlockWindow) -> (u128, u128) {
    let (weighted, sum) = lwma1_weighted_time(params, window);
    let next = weighted_estimate(window.average_difficulty(), weighted.max(1), params, 99);
    (next, sum)
}

/// LWMA-1: linear weights, intervals clamped to `[1, 6T]`, factor 0.99.
#[derive(Clone, Debug)]
pub struct Lwma1 {
    params: RetargetParams,
}

impl Lwma1 {
    pub fn new(params: RetargetParams) -> Result<Self, EstimatorError> {
        let params = checked_params(Algorithm::Lwma1, params, 1)?;
        Ok(Self { params })
    }
}

impl DifficultyEstimator for Lwma1 {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Lwma1
    }

    fn params(&self) -> &RetargetParams {
        &self.params
    }

    fn estimate(&self, request: &RetargetRequest<'_>) -> Result<Difficulty, EstimatorError> {
        let window = request.full_window(&self.params)?;
        let (weighted, _) = lwma1_weighted_time(&self.params, window);
        let weighted = floored_weighted_time(weighted, &self.params);
        let next = weighted_estimate(window.average_difficulty(), weighted, &self.params, 99);
        Ok(Difficulty::from_wide(next))
    }
}

/// LWMA-4: LWMA with a tighter interval clamp, long-drop tempering and a
/// jump floor after improbably fast blocks.
#[derive(Clone, Debug)]
pub struct Lwma4 {
    params: RetargetParams,
}

impl Lwma4 {
    pub const MIN_WINDOW: u64 = 8;

    pub fn new(params: RetargetParams) -> Result<Self, EstimatorError> {
        let params = checked_params(Algorithm::Lwma4, params, Self::MIN_WINDOW)?;
        Ok(Self { params })
    }

    /// Solvetime of interval `i` after tempering. A slow interval that
    /// directly follows 3 or 6 fast ones counts as 2T, otherwise intervals
    /// are capped at 5T.
    fn tempered_solvetime(&self, ts: &[u64], i: usize) -> u64 {
        let t = self.params.target_interval;
        let st = ts[i] - ts[i - 1];
        let long = st > LWMA4_CLAMP.saturating_mul(t);
        if long && i > 4 && ts[i - 1] - ts[i - 4] < t.saturating_mul(14) / 10 {
            debug!(interval = i, st, "long solvetime after 3 fast blocks tempered");
            return t.saturating_mul(2);
        }
        if long && i > 7 && ts[i - 1] - ts[i - 7] < t.saturating_mul(4) {
            debug!(interval = i, st, "long solvetime after 6 fast blocks tempered");
            return t.saturating_mul(2);
        }
        st.min(LWMA4_CLAMP.saturating_mul(t))
    }
}

impl DifficultyEstimator for Lwma4 {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Lwma4
    }

    fn params(&self) -> &RetargetParams {
        &self.params
    }

    fn estimate(&self, request: &RetargetRequest<'_>) -> Result<Difficulty, EstimatorError> {
        let window = request.full_window(&self.params)?;
        let n = window_index(&self.params);
        let t = self.params.target_interval;
        let ts = monotone_timestamps(window.timestamps());

        let weighted = (1..=n).fold(0u128, |acc, i| {
            acc + i as u128 * u128::from(self.tempered_solvetime(&ts, i))
        });
        let weighted = floored_weighted_time(weighted, &self.params);
        let avg_d = window.average_difficulty();
        let mut next = weighted_estimate(avg_d, weighted, &self.params, 97);

        let fast_tail = ts[n] - ts[n - 1] < t.saturating_mul(2) / 10
            || ts[n] - ts[n - 2] < t.saturating_mul(5) / 10
            || ts[n] - ts[n - 3] < t.saturating_mul(8) / 10;
        if fast_tail {
            let prev_d = u128::from(window.last_difficulty());
            let jump = (prev_d * 110 / 100).min(u128::from(avg_d) * 105 / 100);
            if jump > next {
                debug!(next = %next, jump = %jump, "fast tail, jump floor applied");
                next = jump;
            }
        }
        Ok(Difficulty::from_wide(next))
    }
}

/// Weighted harmonic hashrate: linear weights on `ST_i / D_i` instead of
/// on solvetimes, so a block's influence scales with the work it proved.
#[derive(Clone, Debug)]
pub struct Whr {
    params: RetargetParams,
}

impl Whr {
    /// Fixed-point scale of the per-block easiness `ST / D`.
    const EASINESS_SCALE: u128 = 1 << 64;

    pub fn new(params: RetargetParams) -> Result<Self, EstimatorError> {
        let params = checked_params(Algorithm::Whr, params, 1)?;
        Ok(Self { params })
    }
}

impl DifficultyEstimator for Whr {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Whr
    }

    fn params(&self) -> &RetargetParams {
        &self.params
    }

    fn estimate(&self, request: &RetargetRequest<'_>) -> Result<Difficulty, EstimatorError> {
        let window = request.full_window(&self.params)?;
        let t = self.params.target_interval;
        let bounds = SolvetimeBounds::up_to_multiple(t, LWMA1_CLAMP);
        let sts = solvetimes(window.timestamps(), bounds);

        let weighted_easiness = sts.iter().zip(1u128..).fold(0u128, |acc, (&st, i)| {
            let d = u128::from(window.block_difficulty(i as usize).max(1));
            let easiness = mul_div(i * u128::from(st), Self::EASINESS_SCALE, d);
            acc.saturating_add(easiness)
        });

        let n = u128::from(self.params.window_size);
        let weights = n * (n + 1) / 2;
        let next = mul_div(
            u128::from(t) * weights,
            Self::EASINESS_SCALE,
            weighted_easiness,
        );
        Ok(Difficulty::from_wide(next))
    }
}
