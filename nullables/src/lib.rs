//! Deterministic test infrastructure for the retarget estimators.
//!
//! Everything random here is seeded, so a failing statistical test replays
//! exactly. Nothing in this crate is reachable from estimator code paths:
//! estimators never read clocks or randomness.

pub mod chain;
pub mod clock;
pub mod monte_carlo;
pub mod random;

pub use chain::{MinedBlock, SimulatedChain};
pub use clock::TemplateClock;
pub use monte_carlo::MonteCarlo;
pub use random::SolvetimeSampler;
