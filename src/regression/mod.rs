//! Empirical growth estimation.
//!
//! Every canonical growth function is fitted against the sampled costs;
//! the candidate with the highest composite score wins. Degenerate fits
//! stay in the candidate list so callers can see why they lost.

pub mod changes;
pub mod diagnostics;
pub mod fit;

pub use changes::{detect_complexity_changes, ComplexityChange, HalfFit};
pub use diagnostics::SampleDiagnostics;
pub use fit::{composite_score, fit_class, FitResult};

use crate::core::{CostSample, GrowthClass, CANONICAL};
use crate::errors::{Error, Result};
use crate::sampling::MIN_SAMPLES;
use serde::{Deserialize, Serialize};

/// Composite scores closer than this are a tie; the simpler class keeps it.
const SCORE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionReport {
    /// Winning fit; `None` when every candidate was degenerate
    pub best: Option<FitResult>,
    /// One fit per canonical class, simplest first
    pub candidates: Vec<FitResult>,
    pub diagnostics: SampleDiagnostics,
    pub sample_count: usize,
    pub advisories: Vec<String>,
}

impl RegressionReport {
    pub fn best_class(&self) -> GrowthClass {
        self.best
            .as_ref()
            .map_or(GrowthClass::Unknown, |fit| fit.class)
    }

    pub fn r_squared(&self) -> f64 {
        self.best.as_ref().map_or(0.0, |fit| fit.r_squared)
    }

    pub fn confidence(&self) -> f64 {
        self.best.as_ref().map_or(0.0, |fit| fit.confidence)
    }

    pub fn candidate(&self, class: GrowthClass) -> Option<&FitResult> {
        self.candidates.iter().find(|fit| fit.class == class)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegressionEngine;

impl RegressionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Fit all canonical classes. Input order does not matter.
    pub fn fit(&self, samples: &[CostSample]) -> Result<RegressionReport> {
        if samples.len() < MIN_SAMPLES {
            return Err(Error::insufficient_samples(samples.len(), MIN_SAMPLES));
        }

        let sorted = sorted_samples(samples);
        let candidates: Vec<FitResult> = CANONICAL
            .iter()
            .map(|&class| fit_class(class, &sorted))
            .collect();
        let best = select_best(&candidates).cloned();
        let diagnostics = SampleDiagnostics::compute(&sorted, best.as_ref());
        let advisories = advisories(best.as_ref(), &diagnostics);

        tracing::debug!(
            samples = sorted.len(),
            best = %best.as_ref().map_or(GrowthClass::Unknown, |f| f.class),
            r_squared = best.as_ref().map_or(0.0, |f| f.r_squared),
            monotonicity = diagnostics.monotonicity,
            "regression complete"
        );

        Ok(RegressionReport {
            best,
            candidates,
            diagnostics,
            sample_count: sorted.len(),
            advisories,
        })
    }
}

/// Highest composite among selectable fits; earlier (simpler) classes win ties.
pub fn select_best(candidates: &[FitResult]) -> Option<&FitResult> {
    candidates
        .iter()
        .filter(|fit| fit.selectable)
        .fold(None, |best: Option<&FitResult>, fit| match best {
            Some(current) if fit.composite_score <= current.composite_score + SCORE_EPSILON => {
                Some(current)
            }
            _ => Some(fit),
        })
}

pub(crate) fn sorted_samples(samples: &[CostSample]) -> Vec<CostSample> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.size.cmp(&b.size).then(a.cost.total_cmp(&b.cost)));
    sorted
}

fn advisories(best: Option<&FitResult>, diagnostics: &SampleDiagnostics) -> Vec<String> {
    let mut out = Vec::new();
    match best {
        None => out.push("No growth function fits the sampled costs".to_string()),
        Some(fit) if fit.r_squared < 0.5 => out.push(format!(
            "Best fit {} explains little of the measured cost (R² {:.2})",
            fit.class.notation(),
            fit.r_squared
        )),
        Some(_) => {}
    }
    if diagnostics.monotonicity < 0.8 {
        out.push(format!(
            "Measured cost is not monotonic in input size ({:.0}% rising steps)",
            diagnostics.monotonicity * 100.0
        ));
    }
    if !diagnostics.outliers.is_empty() {
        out.push(format!(
            "{} outlier sample(s) may distort the fit",
            diagnostics.outliers.len()
        ));
    }
    out
}
