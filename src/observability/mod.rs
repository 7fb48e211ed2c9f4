//! Observability: pipeline phase tracking, crash reports and log setup.
//!
//! ```ignore
//! use growthmap::observability::{set_phase, AnalysisPhase};
//!
//! let _phase = set_phase(AnalysisPhase::Sampling);
//! // a panic here reports the sampling phase
//! ```

pub mod context;
pub mod logging;
pub mod panic_hook;

pub use context::{
    get_current_context, get_run_counts, record_run_completed, record_run_started,
    set_current_input, set_phase, AnalysisContext, AnalysisPhase, ContextGuard,
};
pub use logging::init_tracing;
pub use panic_hook::install_panic_hook;
