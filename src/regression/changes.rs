//! Change-point detection between the small-size and large-size halves.

use super::RegressionEngine;
use crate::core::{CostSample, GrowthClass};
use serde::{Deserialize, Serialize};

/// Both halves must fit at least this well for a change to count.
pub const CHANGE_MIN_R_SQUARED: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityChange {
    pub has_change: bool,
    /// First size of the upper half
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_point: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<HalfFit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<HalfFit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalfFit {
    pub class: GrowthClass,
    pub r_squared: f64,
}

impl ComplexityChange {
    fn none() -> Self {
        Self {
            has_change: false,
            change_point: None,
            before: None,
            after: None,
        }
    }
}

/// Split the size-ordered samples at their midpoint, refit each half and
/// report whether the best-fit class changes between them.
pub fn detect_complexity_changes(samples: &[CostSample]) -> ComplexityChange {
    let engine = RegressionEngine::new();
    let sorted = super::sorted_samples(samples);
    let mid = sorted.len() / 2;
    let (lower, upper) = sorted.split_at(mid);

    let (Some(before), Some(after)) = (half_fit(&engine, lower), half_fit(&engine, upper)) else {
        return ComplexityChange::none();
    };

    let has_change = before.class != after.class
        && before.r_squared > CHANGE_MIN_R_SQUARED
        && after.r_squared > CHANGE_MIN_R_SQUARED;

    tracing::debug!(
        before = %before.class,
        after = %after.class,
        has_change,
        "complexity change check"
    );

    ComplexityChange {
        has_change,
        change_point: upper.first().map(|s| s.size),
        before: Some(before),
        after: Some(after),
    }
}

fn half_fit(engine: &RegressionEngine, half: &[CostSample]) -> Option<HalfFit> {
    let report = engine.fit(half).ok()?;
    let best = report.best?;
    Some(HalfFit {
        class: best.class,
        r_squared: best.r_squared,
    })
}
