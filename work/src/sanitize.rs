//! Timestamp and solvetime sanitizer.
//!
//! Raw header timestamps can repeat or run backwards. Every estimator reads
//! them through [`monotone_timestamps`], which replaces any timestamp not
//! after its predecessor with `previous + 1`, and then clamps each solvetime
//! to bounds chosen per algorithm.

/// Inclusive per-interval bounds, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolvetimeBounds {
    pub floor: u64,
    pub ceiling: u64,
}

impl SolvetimeBounds {
    /// Only the monotone floor of one second.
    pub const UNBOUNDED: Self = Self {
        floor: 1,
        ceiling: u64::MAX,
    };

    pub fn new(floor: u64, ceiling: u64) -> Self {
        let floor = floor.max(1);
        Self {
            floor,
            ceiling: ceiling.max(floor),
        }
    }

    /// `[1, multiple * target_interval]`, the usual LWMA and EMA clamp.
    pub fn up_to_multiple(target_interval: u64, multiple: u64) -> Self {
        Self::new(1, target_interval.saturating_mul(multiple))
    }

    pub fn clamp(self, solvetime: u64) -> u64 {
        solvetime.clamp(self.floor, self.ceiling)
    }
}

/// Strictly increasing copy of `raw`: each timestamp at or before its
/// predecessor becomes `previous + 1`.
pub fn monotone_timestamps(raw: &[u64]) -> Vec<u64> {
    let mut out = Vec::with_capacity(raw.len());
    for &t in raw {
        let t = match out.last() {
            Some(&prev) if t <= prev => prev.saturating_add(1),
            _ => t,
        };
        out.push(t);
    }
    out
}

/// Sanitized solvetimes of `raw`, one per interval, clamped to `bounds`.
pub fn solvetimes(raw: &[u64], bounds: SolvetimeBounds) -> Vec<u64> {
    monotone_timestamps(raw)
        .windows(2)
        .map(|pair| bounds.clamp(pair[1].saturating_sub(pair[0])))
        .collect()
}

/// Median of `values`; the upper median for even lengths, zero when empty.
pub fn median(values: &[u64]) -> u64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted.get(sorted.len() / 2).copied().unwrap_or(0)
}
