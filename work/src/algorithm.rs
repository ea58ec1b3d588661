//! Algorithm selection by name.

use std::fmt;
use std::str::FromStr;

use retarget_types::RetargetParams;
use serde::{Deserialize, Serialize};

use crate::error::EstimatorError;
use crate::estimator::DifficultyEstimator;
use crate::exponential::{Asert, Ema, Tsa};
use crate::kgw::Kgw;
use crate::linear::{Dgw, Digishield, DigishieldUndelayed, Sma};
use crate::lwma::{Lwma1, Lwma4, Whr};

/// Every estimator this crate implements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    Sma,
    Dgw,
    Digishield,
    DigishieldUndelayed,
    Lwma1,
    Lwma4,
    Whr,
    Kgw,
    Ema,
    Asert,
    Tsa,
}

impl Algorithm {
    pub const ALL: [Algorithm; 11] = [
        Algorithm::Sma,
        Algorithm::Dgw,
        Algorithm::Digishield,
        Algorithm::DigishieldUndelayed,
        Algorithm::Lwma1,
        Algorithm::Lwma4,
        Algorithm::Whr,
        Algorithm::Kgw,
        Algorithm::Ema,
        Algorithm::Asert,
        Algorithm::Tsa,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Sma => "sma",
            Algorithm::Dgw => "dgw",
            Algorithm::Digishield => "digishield",
            Algorithm::DigishieldUndelayed => "digishield-undelayed",
            Algorithm::Lwma1 => "lwma1",
            Algorithm::Lwma4 => "lwma4",
            Algorithm::Whr => "whr",
            Algorithm::Kgw => "kgw",
            Algorithm::Ema => "ema",
            Algorithm::Asert => "asert",
            Algorithm::Tsa => "tsa",
        }
    }

    /// Whether the estimator reads a template time.
    pub fn needs_template_time(self) -> bool {
        matches!(self, Algorithm::Tsa)
    }

    /// Smallest window size N the estimator accepts.
    pub fn min_window_size(self) -> u64 {
        match self {
            Algorithm::Digishield => Digishield::MIN_WINDOW,
            Algorithm::Lwma4 => Lwma4::MIN_WINDOW,
            _ => 1,
        }
    }

    /// Construct the estimator with validated `params`.
    pub fn build(
        self,
        params: RetargetParams,
    ) -> Result<Box<dyn DifficultyEstimator>, EstimatorError> {
        Ok(match self {
            Algorithm::Sma => Box::new(Sma::new(params)?),
            Algorithm::Dgw => Box::new(Dgw::new(params)?),
            Algorithm::Digishield => Box::new(Digishield::new(params)?),
            Algorithm::DigishieldUndelayed => Box::new(DigishieldUndelayed::new(params)?),
            Algorithm::Lwma1 => Box::new(Lwma1::new(params)?),
            Algorithm::Lwma4 => Box::new(Lwma4::new(params)?),
            Algorithm::Whr => Box::new(Whr::new(params)?),
            Algorithm::Kgw => Box::new(Kgw::new(params)?),
            Algorithm::Ema => Box::new(Ema::new(params)?),
            Algorithm::Asert => Box::new(Asert::new(params)?),
            Algorithm::Tsa => Box::new(Tsa::new(params)?),
        })
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| EstimatorError::UnknownAlgorithm(s.to_string()))
    }
}
