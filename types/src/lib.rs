//! Fundamental value types for deterministic difficulty retargeting.
//!
//! This crate defines the inputs shared by every estimator in the workspace:
//! timestamps, difficulties, the aligned block window, and the explicit
//! retarget configuration that replaces process-wide globals.

pub mod difficulty;
pub mod error;
pub mod params;
pub mod time;
pub mod window;

pub use difficulty::Difficulty;
pub use error::RetargetError;
pub use params::RetargetParams;
pub use time::Timestamp;
pub use window::BlockWindow;
