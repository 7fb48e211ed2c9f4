//! Panic hook printing a short crash report with the pipeline context.

use super::context::{get_current_context, get_run_counts, AnalysisContext};
use std::fmt::Write as _;
use std::panic::PanicHookInfo;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const RULE: &str = "════════════════════════════════════════════════════════════";

/// Install the crash-report hook. Call early in `main`.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));
        eprintln!(
            "{}",
            crash_report(
                &extract_panic_message(info),
                location.as_deref(),
                &get_current_context(),
                get_run_counts(),
            )
        );
        if std::env::var("RUST_BACKTRACE").is_ok() {
            eprintln!("{}", std::backtrace::Backtrace::capture());
        }
    }));
}

fn crash_report(
    message: &str,
    location: Option<&str>,
    context: &AnalysisContext,
    (started, completed): (usize, usize),
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "growthmap {VERSION} crashed on {}", std::env::consts::OS);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "  panic:    {message}");
    if let Some(location) = location {
        let _ = writeln!(out, "  location: {location}");
    }
    match &context.phase {
        Some(phase) => {
            let _ = writeln!(out, "  phase:    {phase}");
        }
        None => {
            let _ = writeln!(out, "  phase:    (not set, crash occurred before analysis started)");
        }
    }
    if let Some(input) = &context.input {
        let _ = writeln!(out, "  input:    {input}");
    }
    let _ = writeln!(out, "  runs:     {completed} of {started} completed");
    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(out, "Run with RUST_BACKTRACE=1 for a stack trace");
    }
    let _ = write!(out, "{RULE}");
    out
}

fn extract_panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::AnalysisPhase;

    #[test]
    fn test_report_includes_phase_and_input() {
        let context = AnalysisContext {
            phase: Some(AnalysisPhase::Regression),
            input: Some("sort.py".to_string()),
        };
        let report = crash_report("boom", Some("src/lib.rs:1:1"), &context, (3, 2));
        assert!(report.contains("panic:    boom"));
        assert!(report.contains("phase:    regression"));
        assert!(report.contains("input:    sort.py"));
        assert!(report.contains("2 of 3 completed"));
    }

    #[test]
    fn test_report_without_context() {
        let report = crash_report("boom", None, &AnalysisContext::new(), (0, 0));
        assert!(report.contains("before analysis started"));
        assert!(!report.contains("location:"));
    }
}
