use serde::{Deserialize, Serialize};

/// Cut-offs used when reconciling structural and measured estimates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileThresholds {
    /// Upper bound on confidence for a full three-way agreement
    #[serde(default = "default_high_confidence_cap")]
    pub high_confidence_cap: f64,

    /// Multiplier applied to the winning candidate at medium agreement
    #[serde(default = "default_medium_discount")]
    pub medium_discount: f64,

    #[serde(default = "default_low_confidence_cap")]
    pub low_confidence_cap: f64,

    #[serde(default = "default_conflict_confidence")]
    pub conflict_confidence: f64,

    /// Labels no further apart than this agree at medium level
    #[serde(default = "default_medium_steps")]
    pub medium_steps: usize,

    /// Labels further apart than this conflict
    #[serde(default = "default_conflict_steps")]
    pub conflict_steps: usize,

    #[serde(default = "default_structural_valid_confidence")]
    pub structural_valid_confidence: f64,

    #[serde(default = "default_regression_valid_r_squared")]
    pub regression_valid_r_squared: f64,

    #[serde(default = "default_regression_min_samples")]
    pub regression_min_samples: usize,
}

impl Default for ReconcileThresholds {
    fn default() -> Self {
        Self {
            high_confidence_cap: default_high_confidence_cap(),
            medium_discount: default_medium_discount(),
            low_confidence_cap: default_low_confidence_cap(),
            conflict_confidence: default_conflict_confidence(),
            medium_steps: default_medium_steps(),
            conflict_steps: default_conflict_steps(),
            structural_valid_confidence: default_structural_valid_confidence(),
            regression_valid_r_squared: default_regression_valid_r_squared(),
            regression_min_samples: default_regression_min_samples(),
        }
    }
}

impl ReconcileThresholds {
    pub fn validate(&self) -> Result<(), String> {
        let unit = [
            ("high_confidence_cap", self.high_confidence_cap),
            ("medium_discount", self.medium_discount),
            ("low_confidence_cap", self.low_confidence_cap),
            ("conflict_confidence", self.conflict_confidence),
            ("structural_valid_confidence", self.structural_valid_confidence),
            ("regression_valid_r_squared", self.regression_valid_r_squared),
        ];
        if let Some((name, value)) = unit.iter().find(|(_, v)| !(0.0..=1.0).contains(v)) {
            return Err(format!("{name} must be within [0, 1], got {value}"));
        }
        if self.medium_steps > self.conflict_steps {
            return Err(format!(
                "medium_steps ({}) cannot exceed conflict_steps ({})",
                self.medium_steps, self.conflict_steps
            ));
        }
        Ok(())
    }
}

fn default_high_confidence_cap() -> f64 {
    0.95
}
fn default_medium_discount() -> f64 {
    0.8
}
fn default_low_confidence_cap() -> f64 {
    0.5
}
fn default_conflict_confidence() -> f64 {
    0.3
}
fn default_medium_steps() -> usize {
    2
}
fn default_conflict_steps() -> usize {
    3
}
fn default_structural_valid_confidence() -> f64 {
    0.7
}
fn default_regression_valid_r_squared() -> f64 {
    0.5
}
fn default_regression_min_samples() -> usize {
    5
}
