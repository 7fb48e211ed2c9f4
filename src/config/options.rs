use crate::complexity::PatternPrecedence;
use crate::errors::{Error, Result};
use crate::sampling::DEFAULT_SIZES;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-call analysis options. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    #[serde(default = "default_enable_sampling")]
    pub enable_sampling: bool,

    /// Ascending, positive input sizes to sample at
    #[serde(default = "default_sample_sizes")]
    pub sample_sizes: Vec<usize>,

    #[serde(default = "default_sampling_time_ceiling_ms")]
    pub sampling_time_ceiling_ms: u64,

    #[serde(default = "default_include_case_analysis")]
    pub include_case_analysis: bool,

    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,

    #[serde(default)]
    pub precedence: PatternPrecedence,

    /// Fixed RNG seed; a fresh one is drawn per run when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            enable_sampling: default_enable_sampling(),
            sample_sizes: default_sample_sizes(),
            sampling_time_ceiling_ms: default_sampling_time_ceiling_ms(),
            include_case_analysis: default_include_case_analysis(),
            max_input_bytes: default_max_input_bytes(),
            precedence: PatternPrecedence::default(),
            seed: None,
        }
    }
}

impl AnalysisOptions {
    pub fn sampling_ceiling(&self) -> Duration {
        Duration::from_millis(self.sampling_time_ceiling_ms)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn without_sampling(mut self) -> Self {
        self.enable_sampling = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_sizes.is_empty() {
            return Err(Error::Configuration("sample_sizes cannot be empty".into()));
        }
        if self.sample_sizes.contains(&0) {
            return Err(Error::Configuration(
                "sample_sizes must be positive".into(),
            ));
        }
        if self.sample_sizes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::Configuration(format!(
                "sample_sizes must be strictly ascending, got {:?}",
                self.sample_sizes
            )));
        }
        if self.sampling_time_ceiling_ms == 0 {
            return Err(Error::Configuration(
                "sampling_time_ceiling_ms must be greater than zero".into(),
            ));
        }
        if self.max_input_bytes == 0 {
            return Err(Error::Configuration(
                "max_input_bytes must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn default_enable_sampling() -> bool {
    true
}
fn default_sample_sizes() -> Vec<usize> {
    DEFAULT_SIZES.to_vec()
}
fn default_sampling_time_ceiling_ms() -> u64 {
    5_000
}
fn default_include_case_analysis() -> bool {
    true
}
fn default_max_input_bytes() -> usize {
    100_000
}
