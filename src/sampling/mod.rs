//! Synthetic cost sampling.
//!
//! Generates one averaged cost measurement per input size through a
//! [`CostModel`]. Sizes are sampled in parallel; a wall-clock ceiling
//! abandons sizes that have not finished in time.

pub mod cost_model;

pub use cost_model::{CostModel, CostProfile, ExactCostModel, MemoryProfile, SyntheticCostModel};

use crate::core::CostSample;
use crate::errors::{Error, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const DEFAULT_SIZES: [usize; 7] = [10, 50, 100, 500, 1000, 5000, 10000];

/// Fewer samples than this cannot support a fit.
pub const MIN_SAMPLES: usize = 3;

/// Iterations averaged per size.
pub fn iterations_for(size: usize) -> usize {
    match size {
        0..=100 => 10,
        101..=1000 => 5,
        _ => 3,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingOutcome {
    /// Ascending by size
    pub samples: Vec<CostSample>,
    /// Some sizes were abandoned at the time ceiling
    pub truncated: bool,
    pub elapsed_ms: u64,
}

pub struct CostSampler<'a> {
    model: &'a dyn CostModel,
    sizes: Vec<usize>,
    ceiling: Duration,
    seed: u64,
}

impl<'a> CostSampler<'a> {
    pub fn new(model: &'a dyn CostModel, seed: u64) -> Self {
        Self {
            model,
            sizes: DEFAULT_SIZES.to_vec(),
            ceiling: Duration::from_millis(5_000),
            seed,
        }
    }

    pub fn with_sizes(mut self, sizes: &[usize]) -> Self {
        self.sizes = sizes.to_vec();
        self
    }

    pub fn with_ceiling(mut self, ceiling: Duration) -> Self {
        self.ceiling = ceiling;
        self
    }

    pub fn sample(&self, profile: &CostProfile) -> Result<SamplingOutcome> {
        let started = Instant::now();

        let measured: Vec<Option<CostSample>> = self
            .sizes
            .par_iter()
            .map(|&size| self.measure(profile, size, started))
            .collect();

        let truncated = measured.iter().any(Option::is_none);
        let mut samples: Vec<CostSample> = measured.into_iter().flatten().collect();
        samples.sort_by_key(|s| s.size);

        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(
            class = %profile.class,
            collected = samples.len(),
            requested = self.sizes.len(),
            truncated,
            elapsed_ms,
            "cost sampling complete"
        );

        if samples.len() < MIN_SAMPLES {
            return Err(Error::insufficient_samples(samples.len(), MIN_SAMPLES));
        }

        Ok(SamplingOutcome {
            samples,
            truncated,
            elapsed_ms,
        })
    }

    fn measure(&self, profile: &CostProfile, size: usize, started: Instant) -> Option<CostSample> {
        let mut rng = StdRng::seed_from_u64(size_seed(self.seed, size));
        let iterations = iterations_for(size);

        let mut total = 0.0;
        for _ in 0..iterations {
            if started.elapsed() > self.ceiling {
                return None;
            }
            total += self.model.iteration_cost(profile, size, &mut rng);
        }

        Some(CostSample {
            size,
            cost: total / iterations as f64,
            iterations,
            memory_estimate: self.model.memory_estimate(profile, size),
        })
    }
}

/// Independent stream per size so parallel order never changes results.
fn size_seed(seed: u64, size: usize) -> u64 {
    seed ^ (size as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
