//! Precondition errors shared across crates.

use thiserror::Error;

/// A caller supplied inputs that no estimator can meaningfully evaluate.
///
/// These are caller bugs, not runtime conditions: estimators fail fast
/// instead of returning a misleading difficulty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetargetError {
    #[error("target interval must be positive")]
    ZeroTargetInterval,

    #[error("window size must be positive")]
    ZeroWindowSize,

    #[error("smoothing parameter must be positive")]
    ZeroSmoothing,

    #[error("difficulty guess must be positive")]
    ZeroDifficultyGuess,

    #[error("window length mismatch: {timestamps} timestamps vs {cumulative} cumulative difficulties")]
    WindowLengthMismatch { timestamps: usize, cumulative: usize },

    #[error("window holds {len} blocks, at most {max} allowed")]
    WindowTooLarge { len: usize, max: usize },

    #[error("window holds {len} blocks, {required} required")]
    WindowTooShort { len: usize, required: usize },

    #[error("cumulative difficulty decreases at index {index}")]
    CumulativeDifficultyDecreasing { index: usize },

    #[error("config error: {0}")]
    Config(String),
}
