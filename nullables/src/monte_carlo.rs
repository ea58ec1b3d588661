//! Parallel seeded trials.

use rayon::prelude::*;

use crate::random::SolvetimeSampler;

/// Runs independent trials in parallel, each with its own sampler.
///
/// Trial `i` is seeded from the base seed and `i` alone, and results come
/// back in trial order, so the outcome does not depend on thread count.
#[derive(Clone, Copy, Debug)]
pub struct MonteCarlo {
    trials: usize,
    seed: u64,
}

impl MonteCarlo {
    pub fn new(trials: usize, seed: u64) -> Self {
        Self { trials, seed }
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Seed of trial `trial` (splitmix64 of the base seed and index).
    pub fn trial_seed(&self, trial: usize) -> u64 {
        let mut z = self
            .seed
            .wrapping_add((trial as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    pub fn run<T, F>(&self, trial: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&mut SolvetimeSampler) -> T + Sync,
    {
        (0..self.trials)
            .into_par_iter()
            .map(|i| {
                let mut sampler = SolvetimeSampler::seeded(self.trial_seed(i));
                trial(&mut sampler)
            })
            .collect()
    }

    /// Mean of a scalar statistic over all trials; zero with no trials.
    pub fn mean<F>(&self, trial: F) -> f64
    where
        F: Fn(&mut SolvetimeSampler) -> f64 + Sync,
    {
        if self.trials == 0 {
            return 0.0;
        }
        self.run(trial).iter().sum::<f64>() / self.trials as f64
    }
}
