//! Structural complexity aggregation.

pub mod aggregator;

pub use aggregator::{CodeShape, ComplexityAggregator, PatternPrecedence, StructuralVerdict};
