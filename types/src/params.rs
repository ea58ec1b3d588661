//! Retarget parameters: the explicit configuration every estimator receives.
//!
//! Target interval, window size and fork height are values handed to each
//! estimator at construction, never globals read at call time.

use serde::{Deserialize, Serialize};

use crate::error::RetargetError;

/// Default smoothing for the template-time correction of TSA.
pub const DEFAULT_TEMPLATE_SMOOTHING: u64 = 4;

/// Configuration shared by every difficulty estimator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetargetParams {
    // ── Core ─────────────────────────────────────────────────────────────
    /// Target block interval T in seconds.
    pub target_interval: u64,

    /// Window size N: number of solvetimes an estimator looks at.
    /// Windows passed to estimators hold N + 1 blocks.
    pub window_size: u64,

    // ── Bootstrap ────────────────────────────────────────────────────────
    /// Height at which the algorithm activates (0 for genesis).
    pub fork_height: u64,

    /// Difficulty returned until N + 1 blocks exist after `fork_height`.
    pub difficulty_guess: u64,

    // ── Exponential family ───────────────────────────────────────────────
    /// Smoothing τ in blocks for EMA and ASERT. `None` means τ = N.
    pub smoothing: Option<u64>,

    /// Smoothing M in blocks for the template-time correction of TSA.
    pub template_smoothing: u64,
}

impl RetargetParams {
    /// Parameters for target interval `target_interval` and window size
    /// `window_size`, everything else at its default.
    pub fn new(target_interval: u64, window_size: u64) -> Self {
        Self {
            target_interval,
            window_size,
            ..Self::default()
        }
    }

    pub fn with_fork_height(mut self, fork_height: u64) -> Self {
        self.fork_height = fork_height;
        self
    }

    pub fn with_difficulty_guess(mut self, difficulty_guess: u64) -> Self {
        self.difficulty_guess = difficulty_guess;
        self
    }

    pub fn with_smoothing(mut self, smoothing: u64) -> Self {
        self.smoothing = Some(smoothing);
        self
    }

    pub fn with_template_smoothing(mut self, template_smoothing: u64) -> Self {
        self.template_smoothing = template_smoothing;
        self
    }

    /// Reject parameters no estimator can work with.
    pub fn validate(&self) -> Result<(), RetargetError> {
        if self.target_interval == 0 {
            return Err(RetargetError::ZeroTargetInterval);
        }
        if self.window_size == 0 {
            return Err(RetargetError::ZeroWindowSize);
        }
        if self.smoothing == Some(0) || self.template_smoothing == 0 {
            return Err(RetargetError::ZeroSmoothing);
        }
        if self.difficulty_guess == 0 {
            return Err(RetargetError::ZeroDifficultyGuess);
        }
        Ok(())
    }

    /// Effective τ for EMA and ASERT.
    pub fn smoothing_blocks(&self) -> u64 {
        self.smoothing.unwrap_or(self.window_size)
    }

    /// Number of blocks a full window holds (N + 1).
    pub fn window_len(&self) -> usize {
        usize::try_from(self.window_size)
            .unwrap_or(usize::MAX)
            .saturating_add(1)
    }

    /// Whether `height` is still inside the bootstrap period, i.e. fewer
    /// than N + 1 blocks exist after the fork (or genesis).
    pub fn is_bootstrap(&self, height: u64) -> bool {
        height
            < self
                .fork_height
                .saturating_add(self.window_size)
                .saturating_add(1)
    }

    /// Parse parameters from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, RetargetError> {
        let params: Self = toml::from_str(s).map_err(|e| RetargetError::Config(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }
}

/// Two-minute blocks with a 90-block window, the usual LWMA pairing.
impl Default for RetargetParams {
    fn default() -> Self {
        Self {
            target_interval: 120,
            window_size: 90,
            fork_height: 0,
            difficulty_guess: 100_000,
            smoothing: None,
            template_smoothing: DEFAULT_TEMPLATE_SMOOTHING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(RetargetParams::default().validate().is_ok());
    }

    #[test]
    fn zero_values_rejected() {
        assert_eq!(
            RetargetParams::new(0, 10).validate(),
            Err(RetargetError::ZeroTargetInterval)
        );
        assert_eq!(
            RetargetParams::new(10, 0).validate(),
            Err(RetargetError::ZeroWindowSize)
        );
        assert_eq!(
            RetargetParams::new(10, 10).with_smoothing(0).validate(),
            Err(RetargetError::ZeroSmoothing)
        );
        assert_eq!(
            RetargetParams::new(10, 10).with_difficulty_guess(0).validate(),
            Err(RetargetError::ZeroDifficultyGuess)
        );
    }

    #[test]
    fn smoothing_defaults_to_window_size() {
        let params = RetargetParams::new(60, 45);
        assert_eq!(params.smoothing_blocks(), 45);
        assert_eq!(params.with_smoothing(8).smoothing_blocks(), 8);
    }

    #[test]
    fn bootstrap_boundary() {
        let params = RetargetParams::new(60, 10).with_fork_height(100);
        assert!(params.is_bootstrap(0));
        assert!(params.is_bootstrap(110));
        assert!(!params.is_bootstrap(111));
    }

    #[test]
    fn toml_round_trip_with_partial_fields() {
        let params = RetargetParams::from_toml_str(
            r#"
            target_interval = 600
            window_size = 144
            fork_height = 5000
            "#,
        )
        .unwrap();
        assert_eq!(params.target_interval, 600);
        assert_eq!(params.window_size, 144);
        assert_eq!(params.fork_height, 5000);
        assert_eq!(params.template_smoothing, DEFAULT_TEMPLATE_SMOOTHING);
    }

    #[test]
    fn invalid_toml_reports_config_error() {
        let err = RetargetParams::from_toml_str("target_interval = \"fast\"").unwrap_err();
        assert!(matches!(err, RetargetError::Config(_)));
        let err = RetargetParams::from_toml_str("target_interval = 0").unwrap_err();
        assert_eq!(err, RetargetError::ZeroTargetInterval);
    }
}
