mod common;

use common::*;
use growthmap::config::{load_config_from, CONFIG_FILE_NAME};
use growthmap::core::GrowthClass;
use growthmap::reconcile::{AgreementLevel, ExternalMergePolicy, ExternalOpinion, VerdictClass};
use growthmap::sampling::ExactCostModel;
use growthmap::{analyze, AnalysisOptions, CancellationToken, Error, Pipeline, PatternPrecedence};
use indoc::indoc;
use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn growthmap() -> Command {
    Command::new(env!("CARGO_BIN_EXE_growthmap"))
}

#[test]
fn test_config_file_drives_options_and_thresholds() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        indoc! {r#"
            [analysis]
            enable_sampling = false
            include_case_analysis = false
            precedence = "structure_first"

            [thresholds]
            medium_discount = 0.5
        "#},
    )
    .unwrap();
    let nested = dir.path().join("src").join("algorithms");
    std::fs::create_dir_all(&nested).unwrap();

    let config = load_config_from(nested);
    assert!(!config.analysis.enable_sampling);
    assert_eq!(config.analysis.precedence, PatternPrecedence::StructureFirst);

    let report = Pipeline::new(config.analysis.clone())
        .with_thresholds(config.thresholds.clone())
        .run(LINEAR_SEARCH)
        .unwrap();
    assert!(report.diagnostics.samples.is_empty());
    assert!(report.verdict.cases.is_none());
    assert_eq!(report.verdict.agreement, AgreementLevel::Medium);
    assert!(report.verdict.confidence <= 0.5);
}

#[test]
fn test_exact_cost_model_gives_exact_fit() {
    let model = ExactCostModel { coefficient: 2.5 };
    let report = Pipeline::new(AnalysisOptions::default().with_seed(5))
        .with_cost_model(&model)
        .run(BUBBLE_SORT)
        .unwrap();
    let regression = report.diagnostics.regression.unwrap();
    let best = regression.best.unwrap();
    assert_eq!(best.class, GrowthClass::Quadratic);
    assert!((best.coefficient - 2.5).abs() < 1e-9);
    assert!(best.r_squared > 0.999);
    assert!(regression.diagnostics.outliers.is_empty());
    assert!(!report.verdict.warnings.iter().any(|w| w.contains("outlier")));
    assert!(report.verdict.validation.regression_valid);
}

#[test]
fn test_cancelled_run_reports_the_stage() {
    let token = CancellationToken::new();
    token.cancel();
    let err = Pipeline::new(AnalysisOptions::default())
        .with_cancellation(token)
        .run(MERGE_SORT)
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled { .. }));
}

#[test]
fn test_external_opinion_is_merged_by_the_caller() {
    let report = analyze(HEAP_SORT, &AnalysisOptions::default().without_sampling()).unwrap();
    let core_confidence = report.verdict.confidence;

    let opinion = ExternalOpinion {
        source: "reviewer".to_string(),
        time_class: GrowthClass::Quadratic,
        confidence: 0.99,
        notes: Vec::new(),
    };
    let kept = report
        .verdict
        .clone()
        .merge_external(opinion.clone(), ExternalMergePolicy::KeepCore);
    assert_eq!(kept.confidence, core_confidence);
    assert!(kept.warnings.iter().any(|w| w.contains("reviewer")));
    assert_eq!(kept.external.as_ref(), Some(&opinion));

    let adopted = report
        .verdict
        .merge_external(opinion, ExternalMergePolicy::PreferExternalWhenConfident(0.9));
    assert_eq!(adopted.time, VerdictClass::Exact(GrowthClass::Quadratic));
    assert_eq!(adopted.confidence, 0.99);
}

#[test]
fn test_cli_reads_stdin_and_writes_json() {
    let dir = TempDir::new().unwrap();
    let mut child = growthmap()
        .current_dir(dir.path())
        .args(["analyze", "-", "--format", "json", "--no-sampling"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(LINEAR_SEARCH.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["verdict"]["time"]["exact"], "linear");
    assert_eq!(json["diagnostics"]["matches"][0]["name"], "Linear Search");
}

#[test]
fn test_cli_rejects_oversized_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("big.py");
    std::fs::write(&input, MERGE_SORT).unwrap();
    let output = growthmap()
        .current_dir(dir.path())
        .args(["analyze", input.to_str().unwrap(), "--max-bytes", "16"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("exceeds"));
}

#[test]
fn test_cli_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let first = growthmap().current_dir(dir.path()).arg("init").output().unwrap();
    assert!(first.status.success());
    assert!(dir.path().join(CONFIG_FILE_NAME).exists());

    let second = growthmap().current_dir(dir.path()).arg("init").output().unwrap();
    assert!(!second.status.success());

    let forced = growthmap()
        .current_dir(dir.path())
        .args(["init", "--force"])
        .output()
        .unwrap();
    assert!(forced.status.success());
}
