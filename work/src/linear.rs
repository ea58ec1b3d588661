//! Simple-average members of the linear family.
//!
//! Each computes `avg_D * T / timespan` over the window with a uniform
//! weight, differing only in how the timespan is measured and bounded.

use retarget_types::{BlockWindow, Difficulty, RetargetParams};
use tracing::debug;

use crate::algorithm::Algorithm;
use crate::arith::mul_div;
use crate::error::EstimatorError;
use crate::estimator::{checked_params, window_index, DifficultyEstimator, RetargetRequest};
use crate::sanitize::{median, monotone_timestamps};

/// Timestamps of the window, made strictly increasing.
fn sanitized_span(window: &BlockWindow, n: usize) -> u64 {
    let ts = monotone_timestamps(window.timestamps());
    ts[n].saturating_sub(ts[0])
}

/// Plain simple moving average over the whole window.
#[derive(Clone, Debug)]
pub struct Sma {
    params: RetargetParams,
}

impl Sma {
    pub fn new(params: RetargetParams) -> Result<Self, EstimatorError> {
        let params = checked_params(Algorithm::Sma, params, 1)?;
        Ok(Self { params })
    }
}

impl DifficultyEstimator for Sma {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Sma
    }

    fn params(&self) -> &RetargetParams {
        &self.params
    }

    fn estimate(&self, request: &RetargetRequest<'_>) -> Result<Difficulty, EstimatorError> {
        let window = request.full_window(&self.params)?;
        let n = window_index(&self.params);
        let timespan = sanitized_span(window, n).max(self.params.window_size);
        let next = mul_div(
            u128::from(window.total_work()),
            u128::from(self.params.target_interval),
            u128::from(timespan),
        );
        Ok(Difficulty::from_wide(next))
    }
}

/// Dark Gravity Wave reduced to its effect: an SMA whose timespan is held
/// within a factor of three of the target timespan.
#[derive(Clone, Debug)]
pub struct Dgw {
    params: RetargetParams,
}

impl Dgw {
    pub const TIMESPAN_FACTOR: u64 = 3;

    pub fn new(params: RetargetParams) -> Result<Self, EstimatorError> {
        let params = checked_params(Algorithm::Dgw, params, 1)?;
        Ok(Self { params })
    }
}

impl DifficultyEstimator for Dgw {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Dgw
    }

    fn params(&self) -> &RetargetParams {
        &self.params
    }

    fn estimate(&self, request: &RetargetRequest<'_>) -> Result<Difficulty, EstimatorError> {
        let window = request.full_window(&self.params)?;
        let n = window_index(&self.params);
        let target_span = self
            .params
            .target_interval
            .saturating_mul(self.params.window_size);
        let low = (target_span / Self::TIMESPAN_FACTOR).max(1);
        let high = target_span.saturating_mul(Self::TIMESPAN_FACTOR);
        let measured = sanitized_span(window, n);
        let timespan = measured.clamp(low, high);
        if timespan != measured {
            debug!(measured, timespan, "dgw timespan clamped");
        }
        let next = mul_div(
            u128::from(window.total_work()),
            u128::from(self.params.target_interval),
            u128::from(timespan),
        );
        Ok(Difficulty::from_wide(next))
    }
}

/// Digishield with window edges taken as the median of 11 raw timestamps,
/// which delays the response by about five blocks at each end.
///
/// Medians are taken over raw timestamps: a single forged timestamp moves
/// neither edge, whereas the monotone rewrite would drag every later
/// timestamp along with it.
#[derive(Clone, Debug)]
pub struct Digishield {
    params: RetargetParams,
}

impl Digishield {
    pub const MEDIAN_SPAN: usize = 11;
    /// Smallest N that leaves at least two blocks between the median edges.
    pub const MIN_WINDOW: u64 = 12;

    pub fn new(params: RetargetParams) -> Result<Self, EstimatorError> {
        let params = checked_params(Algorithm::Digishield, params, Self::MIN_WINDOW)?;
        Ok(Self { params })
    }
}

impl DifficultyEstimator for Digishield {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Digishield
    }

    fn params(&self) -> &RetargetParams {
        &self.params
    }

    fn estimate(&self, request: &RetargetRequest<'_>) -> Result<Difficulty, EstimatorError> {
        let window = request.full_window(&self.params)?;
        let n = window_index(&self.params);
        let raw = window.timestamps();
        let start = median(&raw[..Self::MEDIAN_SPAN]);
        let end = median(&raw[n + 1 - Self::MEDIAN_SPAN..]);
        let blocks = (n + 1 - Self::MEDIAN_SPAN) as u64;

        let t = u128::from(self.params.target_interval);
        let target_span = u128::from(blocks) * t;
        let actual = u128::from(end.saturating_sub(start).max(1));
        let damped = (3 * target_span + actual) / 4;
        let low = (target_span * 84 / 100).max(1);
        let high = (target_span * 132 / 100).max(low);
        let timespan = damped.clamp(low, high);

        let work = u128::from(window.recent_work(blocks as usize));
        Ok(Difficulty::from_wide(mul_div(work, t, timespan)))
    }
}

/// Digishield damping applied to the full window without median delay.
#[derive(Clone, Debug)]
pub struct DigishieldUndelayed {
    params: RetargetParams,
}

impl DigishieldUndelayed {
    pub fn new(params: RetargetParams) -> Result<Self, EstimatorError> {
        let params = checked_params(Algorithm::DigishieldUndelayed, params, 1)?;
        Ok(Self { params })
    }
}

impl DifficultyEstimator for DigishieldUndelayed {
    fn algorithm(&self) -> Algorithm {
        Algorithm::DigishieldUndelayed
    }

    fn params(&self) -> &RetargetParams {
        &self.params
    }

    fn estimate(&self, request: &RetargetRequest<'_>) -> Result<Difficulty, EstimatorError> {
        let window = request.full_window(&self.params)?;
        let n = window_index(&self.params);
        let t = u128::from(self.params.target_interval);
        let actual = u128::from(sanitized_span(window, n).max(self.params.window_size));
        let target_span = u128::from(self.params.window_size) * t;
        let work = u128::from(window.total_work());
        let next = mul_div(work * 4, t, 3 * target_span + actual);
        Ok(Difficulty::from_wide(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{request_at, steady_window, window_with_solvetimes};

    fn params(t: u64, n: u64) -> RetargetParams {
        RetargetParams::new(t, n)
    }

    #[test]
    fn sma_fixed_point_at_steady_state() {
        let sma = Sma::new(params(1, 3)).unwrap();
        let w = steady_window(3, 1, 1);
        assert_eq!(sma.estimate(&request_at(&w, 10)).unwrap().get(), 1);

        let sma = Sma::new(params(120, 60)).unwrap();
        let w = steady_window(60, 120, 50_000);
        assert_eq!(sma.estimate(&request_at(&w, 100)).unwrap().get(), 50_000);
    }

    #[test]
    fn sma_follows_solvetime() {
        let sma = Sma::new(params(120, 30)).unwrap();
        let fast = window_with_solvetimes(&[60; 30], 10_000);
        let slow = window_with_solvetimes(&[240; 30], 10_000);
        assert_eq!(sma.estimate(&request_at(&fast, 100)).unwrap().get(), 20_000);
        assert_eq!(sma.estimate(&request_at(&slow, 100)).unwrap().get(), 5_000);
    }

    #[test]
    fn sma_equal_timestamps_are_bounded() {
        let sma = Sma::new(params(120, 10)).unwrap();
        let w = window_with_solvetimes(&[0; 10], 1_000);
        // monotone floor gives one second per block
        assert_eq!(sma.estimate(&request_at(&w, 100)).unwrap().get(), 120_000);
    }

    #[test]
    fn dgw_limits_to_factor_three() {
        let dgw = Dgw::new(params(120, 30)).unwrap();
        let burst = window_with_solvetimes(&[1; 30], 10_000);
        let stall = window_with_solvetimes(&[10_000; 30], 10_000);
        assert_eq!(dgw.estimate(&request_at(&burst, 100)).unwrap().get(), 30_000);
        assert_eq!(dgw.estimate(&request_at(&stall, 100)).unwrap().get(), 3_333);
    }

    #[test]
    fn digishield_steady_and_damped() {
        let ds = Digishield::new(params(120, 40)).unwrap();
        let w = steady_window(40, 120, 9_000);
        assert_eq!(ds.estimate(&request_at(&w, 100)).unwrap().get(), 9_000);

        let fast = window_with_solvetimes(&[60; 40], 9_000);
        let next = ds.estimate(&request_at(&fast, 100)).unwrap().get();
        // damping limits the rise to 1 / 0.84
        assert!(next > 9_000 && next <= 9_000 * 100 / 84 + 1, "{next}");
    }

    #[test]
    fn digishield_ignores_one_forged_timestamp() {
        let ds = Digishield::new(params(120, 40)).unwrap();
        let honest = steady_window(40, 120, 9_000);
        let mut ts = honest.timestamps().to_vec();
        ts[40] += 100_000;
        let forged =
            retarget_types::BlockWindow::new(ts, honest.cumulative_difficulties().to_vec())
                .unwrap();
        assert_eq!(
            ds.estimate(&request_at(&forged, 100)).unwrap(),
            ds.estimate(&request_at(&honest, 100)).unwrap()
        );
    }

    #[test]
    fn digishield_rejects_short_windows() {
        let err = Digishield::new(params(120, 11)).unwrap_err();
        assert_eq!(
            err,
            EstimatorError::WindowTooSmallForAlgorithm {
                algorithm: "digishield",
                window: 11,
                required: 12
            }
        );
    }

    #[test]
    fn undelayed_digishield_steady_state() {
        let ds = DigishieldUndelayed::new(params(120, 17)).unwrap();
        let w = steady_window(17, 120, 777);
        assert_eq!(ds.estimate(&request_at(&w, 100)).unwrap().get(), 777);
        let fast = window_with_solvetimes(&[30; 17], 1_000);
        assert!(ds.estimate(&request_at(&fast, 100)).unwrap().get() > 1_000);
    }
}
