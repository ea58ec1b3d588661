use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsensusError {
    #[error("observation holds no solved blocks")]
    EmptyObservation,

    #[error("solvetime of sample {index} must be positive")]
    NonPositiveSolvetime { index: usize },

    #[error("difficulty of sample {index} must be positive")]
    NonPositiveDifficulty { index: usize },

    #[error("pending block difficulty must be positive")]
    InvalidPendingBlock,

    #[error("tip {index} is not synchronized: head at {head_time}, now is {now}")]
    UnsynchronizedTip { index: usize, head_time: u64, now: u64 },

    #[error("no tips to compare")]
    NoTips,
}
