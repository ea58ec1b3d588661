//! The aligned block window every estimator consumes.
//!
//! A window holds the timestamps and cumulative difficulties of the most
//! recent blocks, oldest first. Index `i` of both sequences describes the
//! same block, so the difficulty of block `i` is
//! `cumulative[i] - cumulative[i - 1]`. The window is rebuilt by the caller
//! for every call; nothing here is cached between blocks.

use crate::error::RetargetError;

/// Timestamps and cumulative difficulties of the most recent blocks.
///
/// Construction checks alignment and that cumulative difficulty never
/// decreases. Raw timestamps are kept as supplied: they may be out of order
/// and are only made monotone by the sanitizer in `retarget-work`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockWindow {
    timestamps: Vec<u64>,
    cumulative: Vec<u64>,
}

impl BlockWindow {
    /// Build a window from raw header timestamps and cumulative difficulties.
    pub fn new(timestamps: Vec<u64>, cumulative: Vec<u64>) -> Result<Self, RetargetError> {
        if timestamps.len() != cumulative.len() {
            return Err(RetargetError::WindowLengthMismatch {
                timestamps: timestamps.len(),
                cumulative: cumulative.len(),
            });
        }
        if let Some(index) = cumulative
            .windows(2)
            .position(|pair| pair[1] < pair[0])
        {
            return Err(RetargetError::CumulativeDifficultyDecreasing { index: index + 1 });
        }
        Ok(Self {
            timestamps,
            cumulative,
        })
    }

    /// Build a window from per-block solvetimes and difficulties.
    ///
    /// The first block sits at `start_time` with cumulative difficulty
    /// `start_cumulative`; every following block adds one solvetime and one
    /// difficulty. Cumulative values saturate at `u64::MAX`.
    pub fn from_solvetimes(
        start_time: u64,
        start_cumulative: u64,
        solvetimes: &[u64],
        difficulties: &[u64],
    ) -> Result<Self, RetargetError> {
        if solvetimes.len() != difficulties.len() {
            return Err(RetargetError::WindowLengthMismatch {
                timestamps: solvetimes.len() + 1,
                cumulative: difficulties.len() + 1,
            });
        }
        let mut timestamps = Vec::with_capacity(solvetimes.len() + 1);
        let mut cumulative = Vec::with_capacity(difficulties.len() + 1);
        timestamps.push(start_time);
        cumulative.push(start_cumulative);
        for (&st, &d) in solvetimes.iter().zip(difficulties) {
            let prev_t = *timestamps.last().unwrap_or(&start_time);
            let prev_c = *cumulative.last().unwrap_or(&start_cumulative);
            timestamps.push(prev_t.saturating_add(st));
            cumulative.push(prev_c.saturating_add(d));
        }
        Self::new(timestamps, cumulative)
    }

    /// Number of blocks in the window (N + 1 when full).
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Number of solvetime intervals the window spans.
    pub fn intervals(&self) -> usize {
        self.len().saturating_sub(1)
    }

    pub fn timestamps(&self) -> &[u64] {
        &self.timestamps
    }

    pub fn cumulative_difficulties(&self) -> &[u64] {
        &self.cumulative
    }

    /// Difficulty of block `index`; zero for index 0 or out of range.
    pub fn block_difficulty(&self, index: usize) -> u64 {
        if index == 0 || index >= self.cumulative.len() {
            return 0;
        }
        self.cumulative[index] - self.cumulative[index - 1]
    }

    /// Sum of block difficulties over the last `count` blocks.
    pub fn recent_work(&self, count: usize) -> u64 {
        if self.cumulative.is_empty() {
            return 0;
        }
        let last = self.intervals();
        let count = count.min(last);
        self.cumulative[last] - self.cumulative[last - count]
    }

    /// Sum of block difficulties over every interval in the window.
    pub fn total_work(&self) -> u64 {
        self.recent_work(self.intervals())
    }

    /// Integer mean of the block difficulties in the window.
    pub fn average_difficulty(&self) -> u64 {
        match self.intervals() {
            0 => 0,
            n => self.total_work() / n as u64,
        }
    }

    /// Difficulty of the newest block.
    pub fn last_difficulty(&self) -> u64 {
        self.block_difficulty(self.intervals())
    }

    /// Timestamp of the newest block, if any.
    pub fn newest_timestamp(&self) -> Option<u64> {
        self.timestamps.last().copied()
    }

    /// Fail unless the window holds exactly `required` blocks.
    pub fn require_len(&self, required: usize) -> Result<(), RetargetError> {
        match self.len() {
            len if len > required => Err(RetargetError::WindowTooLarge { len, max: required }),
            len if len < required => Err(RetargetError::WindowTooShort { len, required }),
            _ => Ok(()),
        }
    }
}
