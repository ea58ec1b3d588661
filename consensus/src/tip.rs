//! Ranking competing chain tips by estimated hashrate.
//!
//! The pending-head rule lowers a tip's estimate the longer its head stays
//! unsolved. Two tips can only be compared that way if their waits are
//! measured to the same instant, so every snapshot must account for the
//! full time up to `now`: its newest block's timestamp plus the pending
//! elapsed time (zero without a pending head).

use retarget_types::Timestamp;
use tracing::debug;

use crate::error::ConsensusError;
use crate::hashrate::{estimate_tip_hashrate, ChainTipObservation};

/// One candidate tip as seen at comparison time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TipSnapshot {
    pub observation: ChainTipObservation,
    /// Timestamp of the tip's newest solved block.
    pub head_time: Timestamp,
}

impl TipSnapshot {
    pub fn new(observation: ChainTipObservation, head_time: Timestamp) -> Self {
        Self {
            observation,
            head_time,
        }
    }

    /// The instant this snapshot's waiting time runs up to.
    fn observed_at(&self) -> Option<u64> {
        let waited = self.observation.pending().map_or(0, |p| p.elapsed);
        self.head_time.as_secs().checked_add(waited)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TipComparison {
    now: Timestamp,
}

impl TipComparison {
    pub fn new(now: Timestamp) -> Self {
        Self { now }
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Estimated hashrate of every tip, in input order.
    ///
    /// Fails on the first tip not synchronized to `now`.
    pub fn estimates(&self, tips: &[TipSnapshot]) -> Result<Vec<f64>, ConsensusError> {
        tips.iter()
            .enumerate()
            .map(|(index, tip)| {
                if tip.observed_at() != Some(self.now.as_secs()) {
                    return Err(ConsensusError::UnsynchronizedTip {
                        index,
                        head_time: tip.head_time.as_secs(),
                        now: self.now.as_secs(),
                    });
                }
                estimate_tip_hashrate(&tip.observation)
            })
            .collect()
    }

    /// Index of the tip with the highest estimate; the earliest wins ties.
    pub fn select_best(&self, tips: &[TipSnapshot]) -> Result<usize, ConsensusError> {
        let estimates = self.estimates(tips)?;
        let mut best: Option<(usize, f64)> = None;
        for (index, &estimate) in estimates.iter().enumerate() {
            match best {
                Some((_, top)) if estimate <= top => {}
                _ => best = Some((index, estimate)),
            }
        }
        let (index, hashrate) = best.ok_or(ConsensusError::NoTips)?;
        debug!(index, hashrate, tips = tips.len(), "selected tip");
        Ok(index)
    }
}
