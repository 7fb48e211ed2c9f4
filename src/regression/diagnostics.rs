//! Sample-set diagnostics computed once per regression run.

use super::fit::FitResult;
use crate::core::CostSample;
use serde::{Deserialize, Serialize};

/// Multiplier on the interquartile range beyond which a cost is an outlier.
const IQR_FENCE: f64 = 1.5;

/// Smallest fence width relative to the upper quartile, so rounding noise
/// on a perfect fit never counts as spread.
const RELATIVE_FENCE_FLOOR: f64 = 1e-6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleDiagnostics {
    /// Sample variance of the costs
    pub variance: f64,
    /// Indices into the size-ordered samples whose cost departs from the
    /// reference fit's prediction by more than the IQR fence
    pub outliers: Vec<usize>,
    /// Fraction of consecutive steps whose cost does not decrease
    pub monotonicity: f64,
}

impl SampleDiagnostics {
    /// Outliers are judged on `cost / predicted` against `reference`, since
    /// raw costs of a growing curve always put the largest size far above
    /// the upper quartile. Without a reference the raw costs are used.
    pub fn compute(samples: &[CostSample], reference: Option<&FitResult>) -> Self {
        let costs: Vec<f64> = samples.iter().map(|s| s.cost).collect();
        let scaled = match reference {
            Some(fit) => prediction_ratios(samples, fit).unwrap_or_else(|| costs.clone()),
            None => costs.clone(),
        };
        Self {
            variance: variance(&costs),
            outliers: iqr_outliers(&scaled),
            monotonicity: monotonicity(&costs),
        }
    }

    pub fn is_monotonic(&self) -> bool {
        self.monotonicity >= 1.0
    }
}

fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

fn prediction_ratios(samples: &[CostSample], fit: &FitResult) -> Option<Vec<f64>> {
    samples
        .iter()
        .map(|s| {
            let predicted = fit.predict(s.size);
            (predicted.is_finite() && predicted > 0.0).then(|| s.cost / predicted)
        })
        .collect()
}

fn iqr_outliers(values: &[f64]) -> Vec<usize> {
    if values.len() < 4 {
        return Vec::new();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let spread = (q3 - q1).max(q3.abs() * RELATIVE_FENCE_FLOOR);
    let (low, high) = (q1 - IQR_FENCE * spread, q3 + IQR_FENCE * spread);

    values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v < low || **v > high)
        .map(|(i, _)| i)
        .collect()
}

/// Linear interpolation between closest ranks.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

fn monotonicity(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 1.0;
    }
    let steps = values.len() - 1;
    let rising = values.windows(2).filter(|w| w[1] >= w[0]).count();
    rising as f64 / steps as f64
}
