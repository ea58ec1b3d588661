//! Deterministic difficulty estimators.
//!
//! Every estimator maps a window of the N + 1 most recent block timestamps
//! and cumulative difficulties to the difficulty of the next block, using
//! integer arithmetic only so that independent nodes agree bit for bit.
//! Two families are provided: linear (simple and linearly weighted
//! averages of solvetime) and exponential (EMA, ASERT and the template-time
//! TSA). All of them share one timestamp sanitizer and one fixed-point
//! exponential.

pub mod algorithm;
mod arith;
pub mod config;
pub mod error;
pub mod estimator;
pub mod exponential;
pub mod fixed_exp;
pub mod kgw;
pub mod linear;
pub mod lwma;
pub mod presentation;
pub mod sanitize;

#[cfg(test)]
mod testing;

pub use algorithm::Algorithm;
pub use arith::mul_div;
pub use config::RetargetConfig;
pub use error::EstimatorError;
pub use estimator::{DifficultyEstimator, RetargetRequest};
pub use exponential::{Asert, Ema, Tsa};
pub use fixed_exp::{checked_exp_scaled, exp_scaled, EXP_SCALE, MAX_EXPONENT_SCALED};
pub use kgw::Kgw;
pub use linear::{Dgw, Digishield, DigishieldUndelayed, Sma};
pub use lwma::{Lwma1, Lwma4, Whr};
pub use presentation::{Presentation, Presented};
pub use sanitize::{monotone_timestamps, solvetimes, SolvetimeBounds};
