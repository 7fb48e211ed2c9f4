//! Structural verdict from the syntax tree and pattern matches.

use crate::core::{AlgorithmMatch, GrowthClass, NodeKind, SyntaxNode};
use crate::patterns::{strongest, RecursionKind};
use serde::{Deserialize, Serialize};

/// Which signal decides the structural time class when a catalogue entry
/// matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternPrecedence {
    /// The strongest match overrides the tree
    #[default]
    PatternFirst,
    /// Matches never change the time class
    StructureFirst,
    /// Whichever of tree and strongest match is more confident
    Strongest,
}

impl std::str::FromStr for PatternPrecedence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "pattern_first" | "pattern" => Ok(Self::PatternFirst),
            "structure_first" | "structure" => Ok(Self::StructureFirst),
            "strongest" => Ok(Self::Strongest),
            other => Err(format!("unknown precedence policy '{other}'")),
        }
    }
}

/// Shape facts used for case analysis and sampling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeShape {
    pub branching: bool,
    /// A `return` directly under some loop
    pub early_exit: bool,
    pub unbounded_loop: bool,
    pub containers: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recursion: Option<RecursionKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralVerdict {
    pub time: GrowthClass,
    pub space: GrowthClass,
    pub confidence: f64,
    /// Time class of the tree alone
    pub tree_class: GrowthClass,
    pub function_count: usize,
    pub loop_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_class: Option<GrowthClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_confidence: Option<f64>,
    pub shape: CodeShape,
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexityAggregator {
    precedence: PatternPrecedence,
}

impl ComplexityAggregator {
    pub fn new(precedence: PatternPrecedence) -> Self {
        Self { precedence }
    }

    pub fn aggregate(&self, root: &SyntaxNode, matches: &[AlgorithmMatch]) -> StructuralVerdict {
        let nodes = root.walk();
        let function_count = nodes.iter().filter(|n| n.kind == NodeKind::Function).count();
        let loop_count = nodes.iter().filter(|n| n.kind == NodeKind::Loop).count();
        let shape = code_shape(&nodes);
        let tree = &root.complexity;
        let best = strongest(matches);

        if root.children.is_empty() && matches.is_empty() {
            return StructuralVerdict {
                time: GrowthClass::Const,
                space: GrowthClass::Const,
                confidence: 1.0,
                tree_class: GrowthClass::Const,
                function_count: 0,
                loop_count: 0,
                primary_pattern: None,
                pattern_class: None,
                pattern_confidence: None,
                shape,
                factors: vec!["empty-input".to_string()],
            };
        }

        let time = match (self.precedence, best) {
            (PatternPrecedence::PatternFirst, Some(m)) => m.time,
            (PatternPrecedence::Strongest, Some(m)) if m.confidence > tree.confidence => m.time,
            _ => tree.time,
        };
        let space = matches
            .iter()
            .map(|m| m.space)
            .fold(tree.space, GrowthClass::max);

        let structural: Vec<f64> = nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Function | NodeKind::Loop))
            .map(|n| n.complexity.confidence)
            .collect();
        let pattern: Vec<f64> = matches.iter().map(|m| m.confidence).collect();
        let confidence = match (mean(&pattern), mean(&structural)) {
            (Some(p), Some(s)) => 0.4 * p + 0.6 * s,
            (Some(only), None) | (None, Some(only)) => only,
            (None, None) => 0.5,
        };

        let mut factors = tree.factors.clone();
        factors.extend(matches.iter().map(|m| format!("pattern:{}", m.name)));

        tracing::debug!(
            tree = %tree.time,
            pattern = ?best.map(|m| m.name.as_str()),
            precedence = ?self.precedence,
            time = %time,
            confidence,
            "structural verdict"
        );

        StructuralVerdict {
            time,
            space,
            confidence: confidence.clamp(0.0, 1.0),
            tree_class: tree.time,
            function_count,
            loop_count,
            primary_pattern: best.map(|m| m.name.clone()),
            pattern_class: best.map(|m| m.time),
            pattern_confidence: best.map(|m| m.confidence),
            shape,
            factors,
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

fn code_shape(nodes: &[&SyntaxNode]) -> CodeShape {
    let has_factor = |tag: &str| {
        nodes
            .iter()
            .any(|n| n.complexity.factors.iter().any(|f| f == tag))
    };
    let recursion = [
        ("divide-and-conquer", RecursionKind::DivideAndConquer),
        ("binary-recursion", RecursionKind::BinaryTree),
        ("linear-recursion", RecursionKind::Linear),
    ]
    .into_iter()
    .find(|(tag, _)| has_factor(tag))
    .map(|(_, kind)| kind);

    CodeShape {
        branching: nodes.iter().any(|n| n.kind == NodeKind::Conditional),
        early_exit: nodes.iter().filter(|n| n.kind == NodeKind::Loop).any(|l| {
            l.walk()
                .iter()
                .any(|n| n.kind == NodeKind::Return)
        }),
        unbounded_loop: has_factor("unbounded-loop"),
        containers: nodes.iter().any(|n| n.metadata.container.is_some()),
        recursion,
    }
}
