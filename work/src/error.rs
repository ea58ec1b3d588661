use retarget_types::RetargetError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimatorError {
    #[error(transparent)]
    Retarget(#[from] RetargetError),

    #[error("template-time estimator called without a template time")]
    MissingTemplateTime,

    #[error("scaled exponent {scaled} is beyond the fixed-point table")]
    ExponentOutOfRange { scaled: u64 },

    #[error("{algorithm} needs a window of at least {required} blocks, configured {window}")]
    WindowTooSmallForAlgorithm {
        algorithm: &'static str,
        window: u64,
        required: u64,
    },

    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),
}
