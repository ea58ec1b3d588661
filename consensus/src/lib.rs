//! Consensus-side hashrate estimation.
//!
//! When two tips compete, the one backed by more hashrate should win. Raw
//! chain work over elapsed time overstates the rate of short runs and of
//! runs with uneven difficulty, so tips are ranked by a bias-corrected
//! harmonic estimate instead.
//!
//! ## Module overview
//!
//! - [`hashrate`]: Per-tip hashrate estimators and the pending-head rule.
//! - [`tip`]: Ranking of synchronized competing tips.
//! - [`error`]: Consensus error types.

pub mod error;
pub mod hashrate;
pub mod tip;

pub use error::ConsensusError;
pub use hashrate::{
    chain_work_rate, erlang_chain_work_rate, estimate_tip_hashrate, harmonic_hashrate,
    ChainTipObservation, HashrateSample, PendingBlock,
};
pub use tip::{TipComparison, TipSnapshot};
