//! Hashrate estimation for a single chain tip.
//!
//! Solvetimes at constant hashrate are exponentially distributed, so the
//! sum of n of them is Erlang and `n / sum` overstates the rate by
//! n / (n - 1). Scaling by (n - 1) / n removes that small-sample bias.
//!
//! Difficulty also varies along a tip. Each `ST_i / D_i` is an exponential
//! draw with mean 1 / HR whatever `D_i` was, so the unbiased estimate is
//! `(n - 1) / Σ (ST_i / D_i)`. The chain-work ratio `ΣD / ΣST` weights fast
//! low-difficulty blocks too heavily and is kept only for comparison.
//!
//! An unsolved head adds information: the miners have been working on it
//! for `tslb` seconds without success. It is folded in as an extra sample
//! only when that lowers the estimate, so a tip never looks stronger
//! because its clock ran longer.

use retarget_types::BlockWindow;
use retarget_work::{solvetimes, SolvetimeBounds};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::ConsensusError;

/// One solved block: its difficulty and the seconds it took.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashrateSample {
    pub difficulty: u64,
    pub solvetime: u64,
}

impl HashrateSample {
    pub fn new(difficulty: u64, solvetime: u64) -> Self {
        Self {
            difficulty,
            solvetime,
        }
    }

    /// Solvetime per unit of difficulty, the quantity that is exponential
    /// with mean 1 / HR.
    fn normalized_solvetime(&self) -> f64 {
        self.solvetime as f64 / self.difficulty as f64
    }
}

/// The head a tip's miners are still working on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBlock {
    pub difficulty: u64,
    /// Seconds since the tip's newest block.
    pub elapsed: u64,
}

impl PendingBlock {
    pub fn new(difficulty: u64, elapsed: u64) -> Self {
        Self {
            difficulty,
            elapsed,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTipObservation {
    samples: Vec<HashrateSample>,
    pending: Option<PendingBlock>,
}

impl ChainTipObservation {
    pub fn new(samples: Vec<HashrateSample>) -> Self {
        Self {
            samples,
            pending: None,
        }
    }

    pub fn with_pending(mut self, pending: PendingBlock) -> Self {
        self.pending = Some(pending);
        self
    }

    /// Samples for every interval of a retarget window.
    ///
    /// Timestamps go through the same monotone sanitizer the estimators use,
    /// so every solvetime is at least one second.
    pub fn from_window(window: &BlockWindow) -> Self {
        let sts = solvetimes(window.timestamps(), SolvetimeBounds::UNBOUNDED);
        let samples = sts
            .iter()
            .enumerate()
            .map(|(i, &st)| HashrateSample::new(window.block_difficulty(i + 1), st))
            .collect();
        Self::new(samples)
    }

    pub fn samples(&self) -> &[HashrateSample] {
        &self.samples
    }

    pub fn pending(&self) -> Option<&PendingBlock> {
        self.pending.as_ref()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

fn validate(samples: &[HashrateSample]) -> Result<(), ConsensusError> {
    if samples.is_empty() {
        return Err(ConsensusError::EmptyObservation);
    }
    for (index, sample) in samples.iter().enumerate() {
        if sample.solvetime == 0 {
            return Err(ConsensusError::NonPositiveSolvetime { index });
        }
        if sample.difficulty == 0 {
            return Err(ConsensusError::NonPositiveDifficulty { index });
        }
    }
    Ok(())
}

/// Naive chain work over elapsed time, `ΣD / ΣST`.
pub fn chain_work_rate(samples: &[HashrateSample]) -> Result<f64, ConsensusError> {
    validate(samples)?;
    let work: f64 = samples.iter().map(|s| s.difficulty as f64).sum();
    let time: f64 = samples.iter().map(|s| s.solvetime as f64).sum();
    Ok(work / time)
}

/// `ΣD / ΣST` with the (n - 1) / n small-sample correction. Unbiased only
/// when difficulty is constant.
pub fn erlang_chain_work_rate(samples: &[HashrateSample]) -> Result<f64, ConsensusError> {
    let n = samples.len() as f64;
    Ok(chain_work_rate(samples)? * (n - 1.0) / n)
}

/// Bias-corrected hashrate, `(n - 1) / Σ (ST_i / D_i)`.
///
/// A single sample carries no unbiased rate information and yields zero.
pub fn harmonic_hashrate(samples: &[HashrateSample]) -> Result<f64, ConsensusError> {
    validate(samples)?;
    let n = samples.len() as f64;
    Ok((n - 1.0) / normalized_time(samples))
}

fn normalized_time(samples: &[HashrateSample]) -> f64 {
    samples.iter().map(HashrateSample::normalized_solvetime).sum()
}

/// Hashrate of a tip for ranking against its competitors.
///
/// Without a pending head this is [`harmonic_hashrate`]. With one, the
/// pending head counts as an (n + 1)-th sample, giving
/// `n / (Σ ST/D + tslb / D_c)`, and the lower of the two estimates is
/// returned. The result is therefore non-increasing and continuous in
/// `tslb`.
///
/// Only meaningful when every competing tip's pending elapsed time is
/// measured to the same "now"; see [`crate::tip::TipComparison`].
pub fn estimate_tip_hashrate(observation: &ChainTipObservation) -> Result<f64, ConsensusError> {
    let without = harmonic_hashrate(&observation.samples)?;
    let Some(pending) = observation.pending else {
        trace!(hashrate = without, samples = observation.len(), "tip hashrate");
        return Ok(without);
    };
    if pending.difficulty == 0 {
        return Err(ConsensusError::InvalidPendingBlock);
    }

    let n = observation.len() as f64;
    let waited = pending.elapsed as f64 / pending.difficulty as f64;
    let with = n / (normalized_time(&observation.samples) + waited);
    if with < without {
        debug!(
            without,
            with,
            tslb = pending.elapsed,
            "pending head lowers tip hashrate"
        );
        return Ok(with);
    }
    trace!(hashrate = without, samples = observation.len(), "tip hashrate");
    Ok(without)
}
