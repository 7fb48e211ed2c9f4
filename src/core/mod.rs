//! Core data model shared by every pipeline stage.

pub mod lattice;
pub mod types;

pub use lattice::{GrowthClass, CANONICAL};
pub use types::{
    AlgorithmMatch, CaseSplit, ComplexityInfo, ContainerKind, CostSample, IterationPattern,
    LineRange, LoopKind, NodeKind, NodeMetadata, SyntaxNode,
};
