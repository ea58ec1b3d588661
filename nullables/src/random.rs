//! Seeded exponential solvetimes.
//!
//! At constant hashrate HR, the time to find a block of difficulty D is
//! exponentially distributed with mean D / HR, so a solvetime is
//! `-ln(U) * D / HR` for U uniform on (0, 1].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct SolvetimeSampler {
    rng: StdRng,
}

impl SolvetimeSampler {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Exponential variate with mean one.
    pub fn unit_exponential(&mut self) -> f64 {
        // gen::<f64>() is in [0, 1); flip it so ln never sees zero.
        let u = 1.0 - self.rng.gen::<f64>();
        -u.ln()
    }

    pub fn solvetime_f64(&mut self, difficulty: f64, hashrate: f64) -> f64 {
        self.unit_exponential() * difficulty / hashrate
    }

    /// Solvetime rounded to whole seconds, as a header timestamp records it.
    pub fn solvetime(&mut self, difficulty: u64, hashrate: f64) -> u64 {
        self.solvetime_f64(difficulty as f64, hashrate).round() as u64
    }

    /// Seed for a nested simulation that owns its own sampler.
    pub fn child_seed(&mut self) -> u64 {
        self.rng.gen()
    }
}
