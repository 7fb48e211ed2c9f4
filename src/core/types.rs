use super::lattice::GrowthClass;
use serde::{Deserialize, Serialize};

/// Per-node complexity estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityInfo {
    pub time: GrowthClass,
    pub space: GrowthClass,
    pub confidence: f64,
    /// Tags naming what drove the estimate (e.g. `nested-loop`, `halving`)
    pub factors: Vec<String>,
    /// True when the estimate follows from the code shape without guessing
    pub exact: bool,
}

impl ComplexityInfo {
    pub fn constant() -> Self {
        Self {
            time: GrowthClass::Const,
            space: GrowthClass::Const,
            confidence: 1.0,
            factors: Vec::new(),
            exact: true,
        }
    }

    pub fn new(time: GrowthClass, space: GrowthClass, confidence: f64) -> Self {
        Self {
            time,
            space,
            confidence: confidence.clamp(0.0, 1.0),
            factors: Vec::new(),
            exact: false,
        }
    }

    pub fn with_factor(mut self, factor: impl Into<String>) -> Self {
        let factor = factor.into();
        if !self.factors.contains(&factor) {
            self.factors.push(factor);
        }
        self
    }
}

impl Default for ComplexityInfo {
    fn default() -> Self {
        Self::constant()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Program,
    Function,
    Loop,
    Conditional,
    Call,
    Variable,
    Return,
}

impl NodeKind {
    /// Kinds that own a body of child statements.
    pub fn opens_block(self) -> bool {
        matches!(
            self,
            NodeKind::Program | NodeKind::Function | NodeKind::Loop | NodeKind::Conditional
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopKind {
    /// C-style counting loop or `for i in range(..)`
    Counting,
    /// `for x in items`, `for (auto& x : v)`, `for (const x of xs)`
    ForEach,
    While,
    DoWhile,
    /// `loop {}` or `while (true)`
    Unbounded,
}

/// How a loop's induction variable advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationPattern {
    /// Fixed literal bound
    Constant,
    /// Variable is halved or doubled each step
    Halving,
    /// `i * i <= n`
    SquareRoot,
    /// Bound depends on an enclosing loop's variable
    DependentIndex,
    /// Bound is a product such as `n * n`
    QuadraticBound,
    Linear,
}

impl IterationPattern {
    pub fn growth(self) -> GrowthClass {
        match self {
            IterationPattern::Constant => GrowthClass::Const,
            IterationPattern::Halving => GrowthClass::Log,
            IterationPattern::SquareRoot => GrowthClass::Sqrt,
            IterationPattern::QuadraticBound => GrowthClass::Quadratic,
            IterationPattern::DependentIndex | IterationPattern::Linear => GrowthClass::Linear,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    Sequence,
    Map,
    Set,
    /// Two-dimensional table
    Matrix,
}

impl ContainerKind {
    pub fn space(self) -> GrowthClass {
        match self {
            ContainerKind::Matrix => GrowthClass::Quadratic,
            _ => GrowthClass::Linear,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_kind: Option<LoopKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration: Option<IterationPattern>,
    pub is_recursive: bool,
    /// Textual self-call sites inside a function body
    pub recursive_calls: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerKind>,
}

/// Line range, 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn contains(&self, line: usize) -> bool {
        (self.start..=self.end).contains(&line)
    }
}

/// Node of the structural syntax tree. Children are exclusively owned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub children: Vec<SyntaxNode>,
    pub complexity: ComplexityInfo,
    pub lines: LineRange,
    pub metadata: NodeMetadata,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, lines: LineRange) -> Self {
        Self {
            kind,
            name: None,
            children: Vec::new(),
            complexity: ComplexityInfo::constant(),
            lines,
            metadata: NodeMetadata::default(),
        }
    }

    /// Depth-first pre-order walk over this node and its descendants.
    pub fn walk(&self) -> Vec<&SyntaxNode> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.walk());
        }
        out
    }

    pub fn count(&self, kind: NodeKind) -> usize {
        self.walk().iter().filter(|n| n.kind == kind).count()
    }

    /// Deepest chain of nested loops below and including this node.
    pub fn loop_depth(&self) -> usize {
        let below = self
            .children
            .iter()
            .map(SyntaxNode::loop_depth)
            .max()
            .unwrap_or(0);
        below + usize::from(self.kind == NodeKind::Loop)
    }
}

/// Best, average and worst case classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSplit {
    pub best: GrowthClass,
    pub average: GrowthClass,
    pub worst: GrowthClass,
}

impl CaseSplit {
    pub fn uniform(class: GrowthClass) -> Self {
        Self {
            best: class,
            average: class,
            worst: class,
        }
    }

    pub fn new(best: GrowthClass, average: GrowthClass, worst: GrowthClass) -> Self {
        Self {
            best,
            average,
            worst,
        }
    }
}

/// A catalogue entry recognised in the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmMatch {
    pub name: String,
    pub time: GrowthClass,
    pub space: GrowthClass,
    pub cases: CaseSplit,
    pub confidence: f64,
    pub evidence: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<LineRange>,
}

/// One synthetic cost measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostSample {
    pub size: usize,
    pub cost: f64,
    pub iterations: usize,
    pub memory_estimate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: NodeKind) -> SyntaxNode {
        SyntaxNode::new(kind, LineRange::new(1, 1))
    }

    #[test]
    fn test_loop_depth_counts_nested_loops_only() {
        let mut inner = leaf(NodeKind::Loop);
        inner.children.push(leaf(NodeKind::Call));
        let mut cond = leaf(NodeKind::Conditional);
        cond.children.push(inner);
        let mut outer = leaf(NodeKind::Loop);
        outer.children.push(cond);
        let mut root = leaf(NodeKind::Program);
        root.children.push(outer);

        assert_eq!(root.loop_depth(), 2);
        assert_eq!(root.count(NodeKind::Loop), 2);
        assert_eq!(root.count(NodeKind::Conditional), 1);
    }

    #[test]
    fn test_line_range_never_inverts() {
        let range = LineRange::new(5, 3);
        assert_eq!(range.end, 5);
        assert!(range.contains(5));
        assert!(!range.contains(6));
    }

    #[test]
    fn test_factor_tags_are_deduplicated() {
        let info = ComplexityInfo::new(GrowthClass::Linear, GrowthClass::Const, 1.4)
            .with_factor("loop")
            .with_factor("loop");
        assert_eq!(info.factors, vec!["loop".to_string()]);
        assert_eq!(info.confidence, 1.0);
    }
}
