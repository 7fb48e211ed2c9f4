//! The estimation pipeline.
//!
//! Stages run strictly in order: parse, pattern match, aggregate, sample,
//! regress, reconcile. Cancellation is observed between stages only.
//! Degradations inside a stage end up as warnings on the verdict; only
//! rejected input, invalid options and cancellation abort a run.

pub mod cancel;

pub use cancel::CancellationToken;

use crate::complexity::{ComplexityAggregator, StructuralVerdict};
use crate::config::{AnalysisOptions, ReconcileThresholds};
use crate::core::{AlgorithmMatch, CostSample};
use crate::errors::{Error, Result, ResultExt};
use crate::observability::{record_run_completed, record_run_started, set_phase, AnalysisPhase};
use crate::parser::normalize::NormalizedSource;
use crate::parser::{ParseStats, StructuralParser};
use crate::patterns::PatternMatcher;
use crate::reconcile::{EmpiricalSignal, FinalVerdict, Reconciler};
use crate::regression::{detect_complexity_changes, ComplexityChange, RegressionEngine, RegressionReport};
use crate::sampling::{CostModel, CostProfile, CostSampler, SyntheticCostModel};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub verdict: FinalVerdict,
    pub diagnostics: AnalysisDiagnostics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDiagnostics {
    pub tree: TreeSummary,
    pub structural: StructuralVerdict,
    pub matches: Vec<AlgorithmMatch>,
    pub samples: Vec<CostSample>,
    pub sampling_truncated: bool,
    /// Seed used for sampling, so a run can be reproduced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regression: Option<RegressionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<ComplexityChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSummary {
    pub functions: usize,
    pub loops: usize,
    pub max_loop_depth: usize,
    pub parse: ParseStats,
}

/// Reject input the pipeline should not look at. Empty input is only an
/// error when `allow_empty` is false.
pub fn validate_input(source: &str, max_bytes: usize, allow_empty: bool) -> Result<()> {
    if source.len() > max_bytes {
        return Err(Error::InputTooLarge {
            actual: source.len(),
            limit: max_bytes,
        });
    }
    if !allow_empty && source.trim().is_empty() {
        return Err(Error::EmptyInput);
    }
    Ok(())
}

/// Run every stage with default thresholds and the synthetic cost model.
pub fn analyze(source: &str, options: &AnalysisOptions) -> Result<AnalysisReport> {
    Pipeline::new(options.clone()).run(source)
}

pub struct Pipeline<'a> {
    options: AnalysisOptions,
    thresholds: ReconcileThresholds,
    model: Option<&'a dyn CostModel>,
    cancellation: CancellationToken,
}

impl<'a> Pipeline<'a> {
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            options,
            thresholds: ReconcileThresholds::default(),
            model: None,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: ReconcileThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Replace the synthetic cost model.
    pub fn with_cost_model(mut self, model: &'a dyn CostModel) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn run(&self, source: &str) -> Result<AnalysisReport> {
        let _span = tracing::info_span!("analyze", bytes = source.len()).entered();
        record_run_started();

        {
            let _phase = set_phase(AnalysisPhase::Validation);
            self.options.validate()?;
            self.thresholds.validate().map_err(Error::Configuration)?;
            validate_input(source, self.options.max_input_bytes, true)?;
        }

        self.checkpoint(AnalysisPhase::Parsing)?;
        let normalized = NormalizedSource::new(source);
        let parsed = {
            let _phase = set_phase(AnalysisPhase::Parsing);
            StructuralParser::new().parse(&normalized)
        };

        self.checkpoint(AnalysisPhase::PatternMatching)?;
        let matches = {
            let _phase = set_phase(AnalysisPhase::PatternMatching);
            PatternMatcher::new().detect(&normalized, &parsed.root)
        };

        self.checkpoint(AnalysisPhase::Aggregation)?;
        let structural = {
            let _phase = set_phase(AnalysisPhase::Aggregation);
            ComplexityAggregator::new(self.options.precedence).aggregate(&parsed.root, &matches)
        };

        let tree = TreeSummary {
            functions: structural.function_count,
            loops: structural.loop_count,
            max_loop_depth: parsed.root.loop_depth(),
            parse: parsed.stats,
        };
        let reconciler = Reconciler::new(self.thresholds.clone())
            .with_case_analysis(self.options.include_case_analysis);

        if normalized.is_blank() {
            tracing::debug!("empty input, skipping sampling");
            let verdict = reconciler.empty_input(&structural);
            record_run_completed();
            return Ok(AnalysisReport {
                verdict,
                diagnostics: AnalysisDiagnostics {
                    tree,
                    structural,
                    matches,
                    samples: Vec::new(),
                    sampling_truncated: false,
                    seed: None,
                    regression: None,
                    changes: None,
                },
            });
        }

        let mut warnings = parse_warnings(&parsed.stats);
        let measured = if self.options.enable_sampling {
            self.checkpoint(AnalysisPhase::Sampling)?;
            self.measure(&structural, &mut warnings)?
        } else {
            Measured::default()
        };

        self.checkpoint(AnalysisPhase::Reconciliation)?;
        let verdict = {
            let _phase = set_phase(AnalysisPhase::Reconciliation);
            let signal = match (&measured.regression, measured.failed) {
                (Some(report), _) => EmpiricalSignal::Measured(report),
                (None, true) => EmpiricalSignal::Failed,
                (None, false) => EmpiricalSignal::Skipped,
            };
            reconciler.reconcile(&structural, signal, &warnings)
        };

        tracing::info!(
            time = %verdict.time,
            confidence = verdict.confidence,
            agreement = %verdict.agreement,
            "analysis complete"
        );
        record_run_completed();

        Ok(AnalysisReport {
            verdict,
            diagnostics: AnalysisDiagnostics {
                tree,
                structural,
                matches,
                samples: measured.samples,
                sampling_truncated: measured.truncated,
                seed: measured.seed,
                regression: measured.regression,
                changes: measured.changes,
            },
        })
    }

    /// Sample and fit. Too few samples degrades to a warning.
    fn measure(&self, structural: &StructuralVerdict, warnings: &mut Vec<String>) -> Result<Measured> {
        let seed = self.options.seed.unwrap_or_else(rand::random);
        let synthetic = SyntheticCostModel::from_rng(&mut StdRng::seed_from_u64(seed));
        let model: &dyn CostModel = match self.model {
            Some(model) => model,
            None => &synthetic,
        };
        let profile = CostProfile::from_verdict(structural);

        let outcome = {
            let _phase = set_phase(AnalysisPhase::Sampling);
            CostSampler::new(model, seed)
                .with_sizes(&self.options.sample_sizes)
                .with_ceiling(self.options.sampling_ceiling())
                .sample(&profile)
        };

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(Error::InsufficientSamples {
                collected,
                required,
            }) => {
                tracing::warn!(collected, required, "sampling fell short");
                warnings.push(format!(
                    "Sampling collected {collected} of the {required} samples needed; no measured estimate"
                ));
                return Ok(Measured {
                    seed: Some(seed),
                    failed: true,
                    ..Measured::default()
                });
            }
            Err(e) => return Err(e),
        };
        if outcome.truncated {
            warnings.push(format!(
                "Sampling hit the {} ms ceiling; fitted {} of {} sizes",
                self.options.sampling_time_ceiling_ms,
                outcome.samples.len(),
                self.options.sample_sizes.len()
            ));
        }

        self.checkpoint(AnalysisPhase::Regression)?;
        let (regression, changes) = {
            let _phase = set_phase(AnalysisPhase::Regression);
            (
                RegressionEngine::new()
                    .fit(&outcome.samples)
                    .context("fitting sampled costs")?,
                detect_complexity_changes(&outcome.samples),
            )
        };
        if let (true, Some(before), Some(after)) = (changes.has_change, changes.before, changes.after) {
            warnings.push(format!(
                "Measured growth shifts from {} to {} around size {}",
                before.class.notation(),
                after.class.notation(),
                changes.change_point.unwrap_or_default()
            ));
        }

        Ok(Measured {
            samples: outcome.samples,
            truncated: outcome.truncated,
            seed: Some(seed),
            regression: Some(regression),
            changes: Some(changes),
            failed: false,
        })
    }

    fn checkpoint(&self, next: AnalysisPhase) -> Result<()> {
        if self.cancellation.is_cancelled() {
            tracing::debug!(stage = %next, "analysis cancelled");
            return Err(Error::cancelled(next.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Measured {
    samples: Vec<CostSample>,
    truncated: bool,
    seed: Option<u64>,
    regression: Option<RegressionReport>,
    changes: Option<ComplexityChange>,
    failed: bool,
}

fn parse_warnings(stats: &ParseStats) -> Vec<String> {
    let mut warnings = Vec::new();
    if stats.unbalanced_blocks > 0 {
        warnings.push(format!(
            "{} block(s) had unbalanced braces; their bodies run to the end of input",
            stats.unbalanced_blocks
        ));
    }
    if stats.skip_ratio() > 0.5 {
        warnings.push(format!(
            "{:.0}% of lines were not recognised; the structural estimate is coarse",
            stats.skip_ratio() * 100.0
        ));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GrowthClass;
    use crate::reconcile::{AgreementLevel, VerdictClass};
    use crate::sampling::ExactCostModel;

    const LOOP: &str = "def total(xs):\n    s = 0\n    for x in xs:\n        s += x\n    return s\n";

    fn options() -> AnalysisOptions {
        AnalysisOptions::default().with_seed(7)
    }

    #[test]
    fn test_programmatic_thresholds_are_validated() {
        let thresholds = ReconcileThresholds {
            medium_steps: 4,
            conflict_steps: 2,
            ..ReconcileThresholds::default()
        };
        let err = Pipeline::new(options())
            .with_thresholds(thresholds)
            .run(LOOP)
            .unwrap_err();
        match err {
            Error::Configuration(message) => assert!(message.contains("medium_steps")),
            other => panic!("expected a configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_input_is_constant() {
        let report = analyze("   \n\t\n", &options()).unwrap();
        assert_eq!(report.verdict.time, VerdictClass::Exact(GrowthClass::Const));
        assert_eq!(report.verdict.confidence, 1.0);
        assert_eq!(report.diagnostics.tree.functions, 0);
        assert_eq!(report.diagnostics.tree.loops, 0);
        assert!(report.diagnostics.samples.is_empty());
    }

    #[test]
    fn test_oversized_input_is_rejected() {
        let opts = AnalysisOptions {
            max_input_bytes: 10,
            ..options()
        };
        let err = analyze(LOOP, &opts).unwrap_err();
        assert!(matches!(err, Error::InputTooLarge { limit: 10, .. }));
    }

    #[test]
    fn test_strict_validation_rejects_empty() {
        assert!(matches!(validate_input("  ", 100, false), Err(Error::EmptyInput)));
        assert!(validate_input("  ", 100, true).is_ok());
    }

    #[test]
    fn test_linear_loop_agrees_with_measurement() {
        let report = analyze(LOOP, &options()).unwrap();
        assert_eq!(report.verdict.time, VerdictClass::Exact(GrowthClass::Linear));
        assert_eq!(report.verdict.agreement, AgreementLevel::High);
        assert_eq!(report.diagnostics.samples.len(), 7);
        assert_eq!(report.diagnostics.seed, Some(7));
    }

    #[test]
    fn test_sampling_disabled() {
        let report = analyze(LOOP, &options().without_sampling()).unwrap();
        assert!(report.diagnostics.regression.is_none());
        assert!(report.verdict.stages.regression.is_none());
        assert_eq!(report.verdict.time_class(), GrowthClass::Linear);
    }

    #[test]
    fn test_insufficient_samples_degrades() {
        let opts = AnalysisOptions {
            sample_sizes: vec![10, 20],
            ..options()
        };
        let report = analyze(LOOP, &opts).unwrap();
        assert!(report.diagnostics.regression.is_none());
        assert!(!report.verdict.validation.regression_valid);
        assert!(report
            .verdict
            .warnings
            .iter()
            .any(|w| w.contains("no measured estimate")));
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let err = Pipeline::new(options())
            .with_cancellation(token)
            .run(LOOP)
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled { .. }));
    }

    #[test]
    fn test_injected_model_is_used() {
        let model = ExactCostModel { coefficient: 3.0 };
        let report = Pipeline::new(options())
            .with_cost_model(&model)
            .run(LOOP)
            .unwrap();
        let best = report.diagnostics.regression.unwrap().best.unwrap();
        assert_eq!(best.class, GrowthClass::Linear);
        assert!((best.coefficient - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let opts = AnalysisOptions {
            sample_sizes: vec![100, 10],
            ..options()
        };
        assert!(matches!(analyze(LOOP, &opts), Err(Error::Configuration(_))));
    }
}
