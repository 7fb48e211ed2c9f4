//! Agreement between the structural, pattern and measured labels.

use crate::config::ReconcileThresholds;
use crate::core::GrowthClass;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgreementLevel {
    High,
    Medium,
    Low,
    Conflict,
}

impl AgreementLevel {
    /// High and medium agreement cross-validate the stages.
    pub fn is_consistent(self) -> bool {
        matches!(self, AgreementLevel::High | AgreementLevel::Medium)
    }
}

impl fmt::Display for AgreementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AgreementLevel::High => "high",
            AgreementLevel::Medium => "medium",
            AgreementLevel::Low => "low",
            AgreementLevel::Conflict => "conflict",
        };
        f.write_str(label)
    }
}

/// Labels taking part in the comparison. A missing pattern stands in for
/// the structural class; unknown labels are dropped.
pub fn comparable_labels(
    structural: GrowthClass,
    pattern: Option<GrowthClass>,
    regression: GrowthClass,
) -> Vec<GrowthClass> {
    [structural, pattern.unwrap_or(structural), regression]
        .into_iter()
        .filter(|c| c.is_known())
        .collect()
}

/// Conflict is checked before partial agreement so that two matching
/// structural labels cannot hide a far-off measurement.
pub fn classify_agreement(labels: &[GrowthClass], thresholds: &ReconcileThresholds) -> AgreementLevel {
    if labels.len() == 3 && labels.iter().all(|c| *c == labels[0]) {
        return AgreementLevel::High;
    }

    let distances: Vec<usize> = pairs(labels)
        .filter_map(|(a, b)| a.steps_between(b))
        .collect();
    if distances.is_empty() {
        return AgreementLevel::Low;
    }

    if distances.iter().any(|&d| d > thresholds.conflict_steps) {
        AgreementLevel::Conflict
    } else if distances.contains(&0) || distances.iter().all(|&d| d <= thresholds.medium_steps) {
        AgreementLevel::Medium
    } else {
        AgreementLevel::Low
    }
}

fn pairs(labels: &[GrowthClass]) -> impl Iterator<Item = (GrowthClass, GrowthClass)> + '_ {
    labels
        .iter()
        .enumerate()
        .flat_map(move |(i, a)| labels[i + 1..].iter().map(move |b| (*a, *b)))
}
