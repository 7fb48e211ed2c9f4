//! Thread-local context tracking for crash reports.
//!
//! Records which pipeline stage is running and which input is being
//! analyzed. Context is per thread; the run counters are global atomics.
//! Guards restore the previous context on drop.

use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

static RUNS_STARTED: AtomicUsize = AtomicUsize::new(0);
static RUNS_COMPLETED: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static CURRENT_CONTEXT: RefCell<AnalysisContext> = const { RefCell::new(AnalysisContext::new()) };
}

/// Snapshot of what the current thread is doing.
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    pub phase: Option<AnalysisPhase>,
    /// Path or label of the input under analysis
    pub input: Option<String>,
}

impl AnalysisContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: None,
            input: None,
        }
    }
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    Validation,
    Parsing,
    PatternMatching,
    Aggregation,
    Sampling,
    Regression,
    Reconciliation,
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Parsing => write!(f, "parsing"),
            Self::PatternMatching => write!(f, "pattern_matching"),
            Self::Aggregation => write!(f, "aggregation"),
            Self::Sampling => write!(f, "sampling"),
            Self::Regression => write!(f, "regression"),
            Self::Reconciliation => write!(f, "reconciliation"),
        }
    }
}

/// RAII guard restoring the previous context on drop.
pub struct ContextGuard {
    previous: AnalysisContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = self.previous.clone();
        });
    }
}

/// Set the current phase until the guard drops.
#[must_use]
pub fn set_phase(phase: AnalysisPhase) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        ctx.borrow_mut().phase = Some(phase);
        ContextGuard { previous }
    })
}

/// Set the input label until the guard drops.
#[must_use]
pub fn set_current_input(label: impl Into<String>) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        ctx.borrow_mut().input = Some(label.into());
        ContextGuard { previous }
    })
}

pub fn record_run_started() {
    RUNS_STARTED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_run_completed() {
    RUNS_COMPLETED.fetch_add(1, Ordering::Relaxed);
}

#[must_use]
pub fn get_current_context() -> AnalysisContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// (started, completed) analysis runs in this process.
#[must_use]
pub fn get_run_counts() -> (usize, usize) {
    (
        RUNS_STARTED.load(Ordering::Relaxed),
        RUNS_COMPLETED.load(Ordering::Relaxed),
    )
}

pub fn reset_context() {
    CURRENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = AnalysisContext::new();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_guard_restores_previous() {
        reset_context();

        let _phase1 = set_phase(AnalysisPhase::Parsing);
        assert_eq!(get_current_context().phase, Some(AnalysisPhase::Parsing));

        {
            let _phase2 = set_phase(AnalysisPhase::Sampling);
            assert_eq!(get_current_context().phase, Some(AnalysisPhase::Sampling));
        }

        assert_eq!(
            get_current_context().phase,
            Some(AnalysisPhase::Parsing),
            "Phase should be restored to Parsing"
        );
    }

    #[test]
    fn test_input_and_phase_nest() {
        reset_context();

        let _input = set_current_input("bubble.py");
        let _phase = set_phase(AnalysisPhase::Regression);

        let ctx = get_current_context();
        assert_eq!(ctx.phase, Some(AnalysisPhase::Regression));
        assert_eq!(ctx.input.as_deref(), Some("bubble.py"));
    }

    #[test]
    fn test_run_counters_increase() {
        let (started, completed) = get_run_counts();
        record_run_started();
        record_run_completed();
        let (started_after, completed_after) = get_run_counts();
        assert!(started_after > started);
        assert!(completed_after > completed);
    }

    #[test]
    fn test_analysis_phase_display() {
        assert_eq!(AnalysisPhase::PatternMatching.to_string(), "pattern_matching");
        assert_eq!(AnalysisPhase::Reconciliation.to_string(), "reconciliation");
    }

    #[test]
    fn test_empty_context_by_default() {
        reset_context();

        let ctx = get_current_context();
        assert!(ctx.phase.is_none());
        assert!(ctx.input.is_none());
    }
}
