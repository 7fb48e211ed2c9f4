//! Growthmap estimates the asymptotic time and space growth of a source
//! snippet. Structural analysis, algorithm recognition and regression over
//! synthetic cost samples each produce an estimate; the reconciler merges
//! them into one verdict with a confidence and an agreement level.
//!
//! ```ignore
//! use growthmap::{analyze, AnalysisOptions};
//!
//! let report = analyze("for i in range(n):\n    s += i\n", &AnalysisOptions::default())?;
//! println!("{}", report.verdict.time);
//! ```

pub mod cli;
pub mod commands;
pub mod complexity;
pub mod config;
pub mod core;
pub mod errors;
pub mod io;
pub mod observability;
pub mod parser;
pub mod patterns;
pub mod pipeline;
pub mod reconcile;
pub mod regression;
pub mod sampling;

pub use crate::complexity::{ComplexityAggregator, PatternPrecedence, StructuralVerdict};
pub use crate::config::{AnalysisOptions, GrowthmapConfig, ReconcileThresholds};
pub use crate::core::{AlgorithmMatch, CaseSplit, CostSample, GrowthClass};
pub use crate::errors::{Error, Result};
pub use crate::pipeline::{analyze, AnalysisReport, CancellationToken, Pipeline};
pub use crate::reconcile::{AgreementLevel, FinalVerdict, Reconciler, VerdictClass};
pub use crate::regression::{RegressionEngine, RegressionReport};
pub use crate::sampling::{CostModel, CostSampler, SyntheticCostModel};
