//! Block difficulty.
//!
//! A difficulty is proportional to the expected number of hash attempts
//! needed to find a block. Estimators must never produce zero, so the
//! constructors either reject zero or floor it at [`Difficulty::MIN`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A strictly positive block difficulty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Difficulty(u64);

impl Difficulty {
    /// Smallest difficulty any estimator may return.
    pub const MIN: Self = Self(1);
    pub const MAX: Self = Self(u64::MAX);

    /// `None` for zero.
    pub fn new(raw: u64) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    /// Floor `raw` at [`Difficulty::MIN`].
    pub fn floored(raw: u64) -> Self {
        Self(raw.max(1))
    }

    /// Narrow a wide intermediate, saturating at `u64::MAX` and flooring at one.
    pub fn from_wide(raw: u128) -> Self {
        Self(u64::try_from(raw).unwrap_or(u64::MAX).max(1))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for Difficulty {
    type Error = String;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| "difficulty must be positive".to_string())
    }
}

impl From<Difficulty> for u64 {
    fn from(d: Difficulty) -> u64 {
        d.0
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
