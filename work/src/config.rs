//! TOML-loadable estimator configuration.
//!
//! ```toml
//! algorithm = "lwma1"
//!
//! [params]
//! target_interval = 120
//! window_size = 90
//! fork_height = 0
//! difficulty_guess = 100000
//!
//! [presentation]
//! round_insignificant_digits = false
//! ```

use std::path::Path;

use retarget_types::{RetargetError, RetargetParams};
use serde::{Deserialize, Serialize};

use crate::algorithm::Algorithm;
use crate::error::EstimatorError;
use crate::estimator::DifficultyEstimator;
use crate::presentation::{Presentation, Presented};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetargetConfig {
    #[serde(default = "default_algorithm")]
    pub algorithm: Algorithm,

    #[serde(default)]
    pub params: RetargetParams,

    #[serde(default)]
    pub presentation: Presentation,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_algorithm() -> Algorithm {
    Algorithm::Lwma1
}

// ── Impl ───────────────────────────────────────────────────────────────

impl RetargetConfig {
    pub fn new(algorithm: Algorithm, params: RetargetParams) -> Self {
        Self {
            algorithm,
            params,
            presentation: Presentation::default(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, EstimatorError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| RetargetError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, EstimatorError> {
        let config: Self = toml::from_str(s).map_err(|e| RetargetError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, EstimatorError> {
        toml::to_string_pretty(self)
            .map_err(|e| EstimatorError::from(RetargetError::Config(e.to_string())))
    }

    /// Validate and construct the configured estimator, wrapped in its
    /// presentation rules when any are enabled.
    pub fn build(&self) -> Result<Box<dyn DifficultyEstimator>, EstimatorError> {
        let estimator = self.algorithm.build(self.params.clone())?;
        if self.presentation.is_enabled() {
            Ok(Box::new(Presented::new(estimator, self.presentation)))
        } else {
            Ok(estimator)
        }
    }
}

impl Default for RetargetConfig {
    fn default() -> Self {
        Self::new(default_algorithm(), RetargetParams::default())
    }
}
