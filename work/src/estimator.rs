//! The estimator seam shared by every retarget algorithm.

use retarget_types::{BlockWindow, Difficulty, RetargetParams, Timestamp};
use tracing::{debug, trace};

use crate::algorithm::Algorithm;
use crate::error::EstimatorError;

/// Inputs of one difficulty call.
#[derive(Clone, Copy, Debug)]
pub struct RetargetRequest<'a> {
    /// The N + 1 most recent blocks, oldest first.
    pub window: &'a BlockWindow,
    /// Height of the block whose difficulty is being computed.
    pub height: u64,
    /// Network time of an unfinished block template. Only the template-time
    /// estimator reads it.
    pub template_time: Option<Timestamp>,
}

impl<'a> RetargetRequest<'a> {
    pub fn new(window: &'a BlockWindow, height: u64) -> Self {
        Self {
            window,
            height,
            template_time: None,
        }
    }

    pub fn with_template_time(mut self, template_time: Timestamp) -> Self {
        self.template_time = Some(template_time);
        self
    }

    /// The window, once it holds the N + 1 blocks `params` call for.
    pub(crate) fn full_window(
        &self,
        params: &RetargetParams,
    ) -> Result<&'a BlockWindow, EstimatorError> {
        self.window.require_len(params.window_len())?;
        Ok(self.window)
    }
}

/// A deterministic next-difficulty function.
///
/// Implementations hold nothing but their validated parameters. The same
/// request always yields the same difficulty, independent of thread,
/// call order or wall-clock time.
pub trait DifficultyEstimator: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    fn params(&self) -> &RetargetParams;

    /// Compute the estimate, ignoring bootstrap. Fails with
    /// `WindowTooShort` unless the window holds N + 1 blocks.
    fn estimate(&self, request: &RetargetRequest<'_>) -> Result<Difficulty, EstimatorError>;

    /// Next difficulty, or the configured guess while fewer than N + 1
    /// blocks exist after the fork.
    fn next_difficulty(&self, request: &RetargetRequest<'_>) -> Result<Difficulty, EstimatorError> {
        let params = self.params();
        if params.is_bootstrap(request.height) {
            debug!(
                algorithm = %self.algorithm(),
                height = request.height,
                fork_height = params.fork_height,
                "bootstrap, returning difficulty guess"
            );
            return Ok(Difficulty::floored(params.difficulty_guess));
        }
        let next = self.estimate(request)?;
        trace!(algorithm = %self.algorithm(), height = request.height, next = next.get(), "estimate");
        Ok(next)
    }
}

impl<E: DifficultyEstimator + ?Sized> DifficultyEstimator for Box<E> {
    fn algorithm(&self) -> Algorithm {
        (**self).algorithm()
    }

    fn params(&self) -> &RetargetParams {
        (**self).params()
    }

    fn estimate(&self, request: &RetargetRequest<'_>) -> Result<Difficulty, EstimatorError> {
        (**self).estimate(request)
    }

    fn next_difficulty(&self, request: &RetargetRequest<'_>) -> Result<Difficulty, EstimatorError> {
        (**self).next_difficulty(request)
    }
}

/// Validate `params` for `algorithm`, which needs a window of at least
/// `min_window` solvetimes.
pub(crate) fn checked_params(
    algorithm: Algorithm,
    params: RetargetParams,
    min_window: u64,
) -> Result<RetargetParams, EstimatorError> {
    params.validate()?;
    if params.window_size < min_window {
        return Err(EstimatorError::WindowTooSmallForAlgorithm {
            algorithm: algorithm.name(),
            window: params.window_size,
            required: min_window,
        });
    }
    Ok(params)
}

/// Window size N as an index.
pub(crate) fn window_index(params: &RetargetParams) -> usize {
    params.window_len() - 1
}
