//! Block-by-block chain simulator.
//!
//! Drives any [`DifficultyEstimator`] against a miner of known hashrate,
//! keeping only the N + 1 most recent blocks the estimator needs.

use std::collections::VecDeque;

use retarget_types::{BlockWindow, Difficulty, Timestamp};
use retarget_work::{DifficultyEstimator, EstimatorError, RetargetRequest};
use tracing::trace;

use crate::random::SolvetimeSampler;

/// One block produced by the simulator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinedBlock {
    pub height: u64,
    pub timestamp: u64,
    pub difficulty: Difficulty,
    pub solvetime: u64,
}

pub struct SimulatedChain<E> {
    estimator: E,
    sampler: SolvetimeSampler,
    hashrate: f64,
    timestamps: VecDeque<u64>,
    cumulative: VecDeque<u64>,
    height: u64,
}

impl<E: DifficultyEstimator> SimulatedChain<E> {
    /// A chain holding only its genesis block at `start_time`.
    pub fn new(estimator: E, seed: u64, start_time: u64, hashrate: f64) -> Self {
        Self {
            estimator,
            sampler: SolvetimeSampler::seeded(seed),
            hashrate,
            timestamps: VecDeque::from([start_time]),
            cumulative: VecDeque::from([0]),
            height: 0,
        }
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    pub fn hashrate(&self) -> f64 {
        self.hashrate
    }

    pub fn set_hashrate(&mut self, hashrate: f64) {
        self.hashrate = hashrate;
    }

    /// Height of the newest block.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// The window an estimator sees for the next block.
    pub fn window(&self) -> Result<BlockWindow, EstimatorError> {
        let window = BlockWindow::new(
            self.timestamps.iter().copied().collect(),
            self.cumulative.iter().copied().collect(),
        )?;
        Ok(window)
    }

    fn newest_timestamp(&self) -> u64 {
        self.timestamps.back().copied().unwrap_or(0)
    }

    fn difficulty_at(
        &self,
        window: &BlockWindow,
        template_time: Option<u64>,
    ) -> Result<Difficulty, EstimatorError> {
        let mut request = RetargetRequest::new(window, self.height + 1);
        if let Some(template_time) = template_time {
            request = request.with_template_time(Timestamp::new(template_time));
        }
        self.estimator.next_difficulty(&request)
    }

    /// Solve the next block and append it.
    ///
    /// With a template-time estimator the difficulty falls while the miner
    /// waits, so the solve is found by accumulating `hashrate / D(t)` one
    /// second at a time until it reaches an exponential draw. Once the
    /// difficulty stops changing the remainder is solved in closed form.
    pub fn mine_block(&mut self) -> Result<MinedBlock, EstimatorError> {
        let window = self.window()?;
        let newest = self.newest_timestamp();

        let (solvetime, difficulty) = if self.estimator.algorithm().needs_template_time() {
            let target = self.sampler.unit_exponential();
            let mut progress = 0.0;
            let mut elapsed = 0u64;
            let mut previous: Option<Difficulty> = None;
            loop {
                elapsed += 1;
                let d = self.difficulty_at(&window, Some(newest + elapsed))?;
                let step = self.hashrate / d.get() as f64;
                if progress + step >= target {
                    break (elapsed, d);
                }
                if previous == Some(d) && elapsed > self.estimator.params().target_interval * 6 {
                    let remaining = (target - progress - step) * d.get() as f64 / self.hashrate;
                    break (elapsed + remaining.ceil() as u64, d);
                }
                progress += step;
                previous = Some(d);
            }
        } else {
            let d = self.difficulty_at(&window, None)?;
            (self.sampler.solvetime(d.get(), self.hashrate), d)
        };

        let timestamp = newest.saturating_add(solvetime);
        let cumulative = self
            .cumulative
            .back()
            .copied()
            .unwrap_or(0)
            .saturating_add(difficulty.get());
        self.timestamps.push_back(timestamp);
        self.cumulative.push_back(cumulative);
        let keep = self.estimator.params().window_len();
        while self.timestamps.len() > keep {
            self.timestamps.pop_front();
            self.cumulative.pop_front();
        }
        self.height += 1;

        trace!(height = self.height, solvetime, difficulty = difficulty.get(), "mined");
        Ok(MinedBlock {
            height: self.height,
            timestamp,
            difficulty,
            solvetime,
        })
    }

    pub fn mine(&mut self, blocks: usize) -> Result<Vec<MinedBlock>, EstimatorError> {
        (0..blocks).map(|_| self.mine_block()).collect()
    }
}
