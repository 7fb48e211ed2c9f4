//! Reconciliation of the structural, pattern and measured estimates into
//! one verdict.

pub mod advisories;
pub mod agreement;
pub mod cases;
pub mod external;

pub use advisories::{merger_advisories, Advisories};
pub use agreement::{classify_agreement, comparable_labels, AgreementLevel};
pub use cases::case_split;
pub use external::{ExternalMergePolicy, ExternalOpinion};

use crate::complexity::StructuralVerdict;
use crate::config::ReconcileThresholds;
use crate::core::{CaseSplit, GrowthClass};
use crate::regression::RegressionReport;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single class, or an explicit range when the stages conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictClass {
    Exact(GrowthClass),
    Range {
        lower: GrowthClass,
        upper: GrowthClass,
    },
}

impl VerdictClass {
    pub fn lower(&self) -> GrowthClass {
        match *self {
            VerdictClass::Exact(class) => class,
            VerdictClass::Range { lower, .. } => lower,
        }
    }

    pub fn upper(&self) -> GrowthClass {
        match *self {
            VerdictClass::Exact(class) => class,
            VerdictClass::Range { upper, .. } => upper,
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, VerdictClass::Range { .. })
    }

    pub fn contains(&self, class: GrowthClass) -> bool {
        match *self {
            VerdictClass::Exact(exact) => exact == class,
            VerdictClass::Range { lower, upper } => lower <= class && class <= upper,
        }
    }

    pub fn label(&self) -> String {
        match self {
            VerdictClass::Exact(class) => class.notation().to_string(),
            VerdictClass::Range { lower, upper } => {
                format!("between {} and {}", lower.notation(), upper.notation())
            }
        }
    }
}

impl fmt::Display for VerdictClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationFlags {
    pub structural_valid: bool,
    pub regression_valid: bool,
    pub cross_valid: bool,
    /// 0.4·structural + 0.4·regression + 0.2·cross
    pub reliability: f64,
}

impl ValidationFlags {
    fn new(structural_valid: bool, regression_valid: bool, cross_valid: bool) -> Self {
        let weight = |flag: bool, w: f64| if flag { w } else { 0.0 };
        Self {
            structural_valid,
            regression_valid,
            cross_valid,
            reliability: weight(structural_valid, 0.4)
                + weight(regression_valid, 0.4)
                + weight(cross_valid, 0.2),
        }
    }
}

/// Per-stage confidences kept apart until presentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageConfidence {
    pub structural: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regression: Option<f64>,
    pub combined: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalVerdict {
    pub time: VerdictClass,
    pub space: GrowthClass,
    pub confidence: f64,
    pub lower_bound: GrowthClass,
    pub upper_bound: GrowthClass,
    pub agreement: AgreementLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cases: Option<CaseSplit>,
    pub recommendations: Vec<String>,
    pub warnings: Vec<String>,
    pub validation: ValidationFlags,
    pub stages: StageConfidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external: Option<ExternalOpinion>,
}

impl FinalVerdict {
    /// Single class for callers that cannot handle ranges; a range
    /// reports its upper end.
    pub fn time_class(&self) -> GrowthClass {
        self.time.upper()
    }

    pub fn is_conflict(&self) -> bool {
        self.agreement == AgreementLevel::Conflict
    }

    fn warn(&mut self, message: impl Into<String>) {
        advisories::push_unique(&mut self.warnings, message.into());
    }

    fn recommend(&mut self, message: impl Into<String>) {
        advisories::push_unique(&mut self.recommendations, message.into());
    }
}

/// What the measurement side contributed.
#[derive(Debug, Clone, Copy)]
pub enum EmpiricalSignal<'a> {
    Measured(&'a RegressionReport),
    /// Sampling was turned off
    Skipped,
    /// The sampler could not collect enough samples
    Failed,
}

impl<'a> EmpiricalSignal<'a> {
    fn report(self) -> Option<&'a RegressionReport> {
        match self {
            EmpiricalSignal::Measured(report) => Some(report),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    thresholds: ReconcileThresholds,
    include_cases: bool,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReconcileThresholds::default())
    }
}

impl Reconciler {
    pub fn new(thresholds: ReconcileThresholds) -> Self {
        Self {
            thresholds,
            include_cases: true,
        }
    }

    pub fn with_case_analysis(mut self, include: bool) -> Self {
        self.include_cases = include;
        self
    }

    pub fn reconcile(
        &self,
        structural: &StructuralVerdict,
        empirical: EmpiricalSignal<'_>,
        stage_warnings: &[String],
    ) -> FinalVerdict {
        let report = empirical.report();
        let regression_class = report.map_or(GrowthClass::Unknown, RegressionReport::best_class);
        let regression_confidence = regression_class
            .is_known()
            .then(|| report.map_or(0.0, RegressionReport::confidence));

        let labels = comparable_labels(
            structural.tree_class,
            structural.pattern_class,
            regression_class,
        );
        let agreement = classify_agreement(&labels, &self.thresholds);

        let (time, confidence) = self.decide(
            agreement,
            &labels,
            structural,
            regression_class,
            regression_confidence,
        );

        let cases = match time {
            VerdictClass::Exact(class) if self.include_cases => {
                let pattern = structural
                    .primary_pattern
                    .as_deref()
                    .filter(|_| structural.pattern_class == Some(class));
                Some(case_split(class, pattern, &structural.shape))
            }
            _ => None,
        };
        let (lower_bound, upper_bound) = match (time, cases) {
            (VerdictClass::Exact(_), Some(split)) => (split.best, split.worst),
            _ => (time.lower(), time.upper()),
        };

        let validation = self.validate(structural, report, agreement);

        let mut advisories = Advisories::default();
        advisories.extend_warnings(stage_warnings.iter().cloned());
        if let Some(report) = report {
            advisories.extend_warnings(report.advisories.iter().cloned());
        }
        merger_advisories(&time, agreement, &mut advisories);

        tracing::debug!(
            agreement = %agreement,
            time = %time,
            confidence,
            reliability = validation.reliability,
            "verdict reconciled"
        );

        FinalVerdict {
            time,
            space: structural.space,
            confidence,
            lower_bound,
            upper_bound,
            agreement,
            range_label: time.is_range().then(|| time.label()),
            cases,
            recommendations: advisories.recommendations,
            warnings: advisories.warnings,
            validation,
            stages: StageConfidence {
                structural: structural.confidence,
                pattern: structural.pattern_confidence,
                regression: regression_confidence,
                combined: confidence,
            },
            external: None,
        }
    }

    /// Verdict for input with nothing to analyze.
    pub fn empty_input(&self, structural: &StructuralVerdict) -> FinalVerdict {
        let time = VerdictClass::Exact(GrowthClass::Const);
        FinalVerdict {
            time,
            space: GrowthClass::Const,
            confidence: structural.confidence,
            lower_bound: GrowthClass::Const,
            upper_bound: GrowthClass::Const,
            agreement: AgreementLevel::High,
            range_label: None,
            cases: self
                .include_cases
                .then(|| CaseSplit::uniform(GrowthClass::Const)),
            recommendations: Vec::new(),
            warnings: vec!["Input is empty; nothing was analyzed".to_string()],
            validation: self.validate(structural, None, AgreementLevel::High),
            stages: StageConfidence {
                structural: structural.confidence,
                pattern: None,
                regression: None,
                combined: structural.confidence,
            },
            external: None,
        }
    }

    fn decide(
        &self,
        agreement: AgreementLevel,
        labels: &[GrowthClass],
        structural: &StructuralVerdict,
        regression_class: GrowthClass,
        regression_confidence: Option<f64>,
    ) -> (VerdictClass, f64) {
        let t = &self.thresholds;
        match agreement {
            AgreementLevel::High => {
                let confidence = structural
                    .confidence
                    .min(regression_confidence.unwrap_or(structural.confidence))
                    .min(t.high_confidence_cap);
                (VerdictClass::Exact(structural.time), confidence)
            }
            AgreementLevel::Medium => {
                let candidates = [
                    Some((structural.time, structural.confidence)),
                    structural.pattern_class.zip(structural.pattern_confidence),
                    regression_confidence.map(|c| (regression_class, c)),
                ];
                let (class, confidence) = candidates
                    .into_iter()
                    .flatten()
                    .fold(None, |best: Option<(GrowthClass, f64)>, candidate| match best {
                        Some(current) if candidate.1 <= current.1 => Some(current),
                        _ => Some(candidate),
                    })
                    .unwrap_or((structural.time, structural.confidence));
                (VerdictClass::Exact(class), confidence * t.medium_discount)
            }
            AgreementLevel::Low => {
                let (class, confidence) = match regression_confidence {
                    Some(c) => (regression_class, c),
                    None => (structural.time, structural.confidence),
                };
                (VerdictClass::Exact(class), confidence.min(t.low_confidence_cap))
            }
            AgreementLevel::Conflict => {
                let lower = labels.iter().copied().fold(GrowthClass::Unknown, GrowthClass::min);
                let upper = labels.iter().copied().fold(GrowthClass::Unknown, GrowthClass::max);
                (VerdictClass::Range { lower, upper }, t.conflict_confidence)
            }
        }
    }

    fn validate(
        &self,
        structural: &StructuralVerdict,
        report: Option<&RegressionReport>,
        agreement: AgreementLevel,
    ) -> ValidationFlags {
        let t = &self.thresholds;
        let structural_valid = structural.confidence > t.structural_valid_confidence
            && structural.function_count >= 1
            && structural.time.is_known();
        let regression_valid = report.is_some_and(|r| {
            r.best_class().is_known()
                && r.r_squared() > t.regression_valid_r_squared
                && r.sample_count >= t.regression_min_samples
        });
        ValidationFlags::new(structural_valid, regression_valid, agreement.is_consistent())
    }
}
