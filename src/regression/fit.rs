//! Single-parameter least-squares fits against the canonical growth functions.

use crate::core::{CostSample, GrowthClass, CANONICAL};
use serde::{Deserialize, Serialize};

/// One candidate fit `cost ≈ coefficient · f(size)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub class: GrowthClass,
    pub coefficient: f64,
    /// Goodness of fit on relative residuals, in [0, 1]
    pub r_squared: f64,
    pub standard_error: f64,
    /// Bucketed from the F statistic
    pub p_value: f64,
    /// Absolute residuals in sample order
    pub residuals: Vec<f64>,
    pub confidence: f64,
    pub composite_score: f64,
    /// False for degenerate fits, which are reported but never selected
    pub selectable: bool,
}

impl FitResult {
    /// Predicted cost at `size`.
    pub fn predict(&self, size: usize) -> f64 {
        self.coefficient * self.class.evaluate(size as f64)
    }
}

/// Fit `samples` against `class`. Samples are expected in ascending size
/// order; the result does not depend on it.
pub fn fit_class(class: GrowthClass, samples: &[CostSample]) -> FitResult {
    let n = samples.len();
    let basis: Vec<f64> = samples
        .iter()
        .map(|s| class.evaluate(s.size as f64))
        .collect();

    let sum_ff: f64 = basis.iter().map(|f| f * f).sum();
    let sum_yf: f64 = samples.iter().zip(&basis).map(|(s, f)| s.cost * f).sum();
    let coefficient = sum_yf / sum_ff;

    let residuals: Vec<f64> = samples
        .iter()
        .zip(&basis)
        .map(|(s, f)| s.cost - coefficient * f)
        .collect();
    let ss_res: f64 = residuals.iter().map(|r| r * r).sum();

    let relative_ss: f64 = samples
        .iter()
        .zip(&residuals)
        .map(|(s, r)| relative_residual(s.cost, *r).powi(2))
        .sum();
    let r_squared = if n == 0 {
        0.0
    } else {
        (1.0 - relative_ss / n as f64).clamp(0.0, 1.0)
    };

    let standard_error = if n > 1 {
        (ss_res / (n - 1) as f64 / sum_ff).sqrt()
    } else {
        0.0
    };
    let p_value = p_value_bucket(f_statistic(r_squared, n));
    let confidence = fit_confidence(r_squared, n, standard_error, coefficient);
    let composite_score = composite_score(class, r_squared, confidence, p_value);

    let selectable = coefficient.is_finite()
        && r_squared.is_finite()
        && composite_score.is_finite()
        && r_squared > 0.0;

    FitResult {
        class,
        coefficient,
        r_squared,
        standard_error,
        p_value,
        residuals,
        confidence,
        composite_score,
        selectable,
    }
}

fn relative_residual(observed: f64, residual: f64) -> f64 {
    if observed != 0.0 {
        residual / observed
    } else if residual.abs() < f64::EPSILON {
        0.0
    } else {
        1.0
    }
}

/// `F = R²/(1−R²)·(n−1)`; infinite for a perfect fit.
pub fn f_statistic(r_squared: f64, n: usize) -> f64 {
    if r_squared >= 1.0 {
        f64::INFINITY
    } else {
        r_squared / (1.0 - r_squared) * n.saturating_sub(1) as f64
    }
}

/// Coarse p-value for an F statistic.
pub fn p_value_bucket(f: f64) -> f64 {
    match f {
        f if f > 100.0 => 0.001,
        f if f > 20.0 => 0.01,
        f if f > 10.0 => 0.05,
        f if f > 4.0 => 0.1,
        _ => 0.5,
    }
}

fn fit_confidence(r_squared: f64, n: usize, standard_error: f64, coefficient: f64) -> f64 {
    let size_adjustment = match n {
        0..=9 => 0.8,
        10..=14 => 1.0,
        _ => 1.1,
    };
    let relative_error = if coefficient != 0.0 {
        (standard_error / coefficient.abs()).min(0.5)
    } else {
        0.5
    };
    let confidence = r_squared * size_adjustment * (1.0 - relative_error);
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// 1.0 for the simplest canonical class, 0.0 for the most complex.
pub fn simplicity(class: GrowthClass) -> f64 {
    match class.position() {
        Some(index) => 1.0 - index as f64 / (CANONICAL.len() - 1) as f64,
        None => 0.0,
    }
}

pub fn composite_score(class: GrowthClass, r_squared: f64, confidence: f64, p_value: f64) -> f64 {
    0.4 * r_squared + 0.3 * confidence + 0.2 * simplicity(class) + 0.1 * (1.0 - p_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(points: &[(usize, f64)]) -> Vec<CostSample> {
        points
            .iter()
            .map(|&(size, cost)| CostSample {
                size,
                cost,
                iterations: 1,
                memory_estimate: 1.0,
            })
            .collect()
    }

    #[test]
    fn test_exact_linear_fit() {
        let data = samples(&[(10, 30.0), (100, 300.0), (1000, 3000.0)]);
        let fit = fit_class(GrowthClass::Linear, &data);
        assert!((fit.coefficient - 3.0).abs() < 1e-9);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert!(fit.standard_error < 1e-9);
        assert_eq!(fit.p_value, 0.001);
        assert!(fit.selectable);
        assert!((fit.predict(50) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_wrong_shape_scores_poorly() {
        let data = samples(&[(10, 10.0), (100, 100.0), (1000, 1000.0), (10000, 10000.0)]);
        let linear = fit_class(GrowthClass::Linear, &data);
        let cubic = fit_class(GrowthClass::Cubic, &data);
        assert!(linear.r_squared > cubic.r_squared);
        assert!(linear.composite_score > cubic.composite_score);
    }

    #[test]
    fn test_log_basis_at_size_one_is_degenerate() {
        let data = samples(&[(1, 2.0), (1, 2.0), (1, 2.0)]);
        let fit = fit_class(GrowthClass::Log, &data);
        assert!(!fit.coefficient.is_finite());
        assert!(!fit.selectable);
    }

    #[test]
    fn test_zero_costs_fit_constant_exactly() {
        let data = samples(&[(10, 0.0), (20, 0.0), (30, 0.0)]);
        let fit = fit_class(GrowthClass::Const, &data);
        assert_eq!(fit.coefficient, 0.0);
        assert_eq!(fit.r_squared, 1.0);
    }

    #[test]
    fn test_p_value_buckets() {
        assert_eq!(p_value_bucket(f64::INFINITY), 0.001);
        assert_eq!(p_value_bucket(50.0), 0.01);
        assert_eq!(p_value_bucket(15.0), 0.05);
        assert_eq!(p_value_bucket(5.0), 0.1);
        assert_eq!(p_value_bucket(1.0), 0.5);
        assert_eq!(p_value_bucket(f64::NAN), 0.5);
    }

    #[test]
    fn test_simplicity_spans_unit_interval() {
        assert_eq!(simplicity(GrowthClass::Const), 1.0);
        assert_eq!(simplicity(GrowthClass::Factorial), 0.0);
        assert_eq!(simplicity(GrowthClass::Unknown), 0.0);
        assert!(simplicity(GrowthClass::Log) > simplicity(GrowthClass::Linear));
    }

    #[test]
    fn test_small_samples_are_penalised() {
        let few = samples(&[(10, 10.0), (20, 20.0), (30, 30.0)]);
        let fit = fit_class(GrowthClass::Linear, &few);
        assert!((fit.confidence - 0.8).abs() < 1e-9);
    }
}
