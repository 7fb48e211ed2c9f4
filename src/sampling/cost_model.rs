//! Pluggable cost models.

use crate::complexity::StructuralVerdict;
use crate::core::GrowthClass;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Memory growth assumed while sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryProfile {
    Constant,
    Linear,
    Linearithmic,
}

/// Coarse bucket the source falls into for sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostProfile {
    pub class: GrowthClass,
    pub memory: MemoryProfile,
}

impl CostProfile {
    pub fn new(class: GrowthClass, memory: MemoryProfile) -> Self {
        Self { class, memory }
    }

    /// Bucket derived from parser and matcher signals. Unknown code is
    /// sampled as linear.
    pub fn from_verdict(verdict: &StructuralVerdict) -> Self {
        let class = if verdict.time.is_known() {
            verdict.time
        } else {
            GrowthClass::Linear
        };
        let memory = if verdict.shape.containers {
            MemoryProfile::Linear
        } else if verdict.shape.recursion.is_some() {
            MemoryProfile::Linearithmic
        } else {
            MemoryProfile::Constant
        };
        Self { class, memory }
    }
}

/// Produces one synthetic cost per iteration.
pub trait CostModel: Send + Sync {
    fn iteration_cost(&self, profile: &CostProfile, size: usize, rng: &mut StdRng) -> f64;

    fn memory_estimate(&self, profile: &CostProfile, size: usize) -> f64 {
        let n = size.max(1) as f64;
        match profile.memory {
            MemoryProfile::Constant => 1.0,
            MemoryProfile::Linear => n,
            MemoryProfile::Linearithmic => GrowthClass::Linearithmic.evaluate(n),
        }
    }
}

/// `base_factor * f(size) * noise`, noise uniform in [0.8, 1.2].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticCostModel {
    base_factor: f64,
}

impl SyntheticCostModel {
    pub const BASE_FACTOR_RANGE: (f64, f64) = (0.5, 2.0);
    pub const NOISE_RANGE: (f64, f64) = (0.8, 1.2);

    pub fn new(base_factor: f64) -> Self {
        let (lo, hi) = Self::BASE_FACTOR_RANGE;
        Self {
            base_factor: base_factor.clamp(lo, hi),
        }
    }

    /// Draw the per-run base factor.
    pub fn from_rng(rng: &mut impl Rng) -> Self {
        let (lo, hi) = Self::BASE_FACTOR_RANGE;
        Self::new(rng.gen_range(lo..=hi))
    }

    pub fn base_factor(&self) -> f64 {
        self.base_factor
    }
}

impl CostModel for SyntheticCostModel {
    fn iteration_cost(&self, profile: &CostProfile, size: usize, rng: &mut StdRng) -> f64 {
        let (lo, hi) = Self::NOISE_RANGE;
        self.base_factor * profile.class.evaluate(size as f64) * rng.gen_range(lo..=hi)
    }
}

/// Noise-free model, mostly for tests and benchmarks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExactCostModel {
    pub coefficient: f64,
}

impl CostModel for ExactCostModel {
    fn iteration_cost(&self, profile: &CostProfile, size: usize, _rng: &mut StdRng) -> f64 {
        self.coefficient * profile.class.evaluate(size as f64)
    }
}
