//! Tolerant structural parser.
//!
//! Builds a [`SyntaxNode`] tree from a [`NormalizedSource`] in a single
//! recursive pass over line ranges and computes [`ComplexityInfo`] bottom
//! up as each block closes. Nothing here fails: unrecognised lines are
//! skipped and unmatched braces run to the end of the enclosing range.

pub mod blocks;
pub mod classify;
pub mod normalize;

use crate::core::{ComplexityInfo, GrowthClass, LineRange, LoopKind, NodeKind, SyntaxNode};
use crate::patterns::recursion::{
    classify_recursion, count_self_calls, has_halving_evidence, has_merge_step, RecursionKind,
};
use blocks::block_end;
use classify::{
    classify_line, container_kind, has_inline_iteration, iteration_pattern, library_call_growth,
    loop_kind,
};
use normalize::{NormalizedLine, NormalizedSource};
use serde::{Deserialize, Serialize};

/// Blocks nested deeper than this are kept opaque.
pub const MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    pub total_lines: usize,
    pub classified_lines: usize,
    /// Non-blank lines that matched no rule, excluding lone braces and `else`
    pub skipped_lines: usize,
    pub unbalanced_blocks: usize,
}

impl ParseStats {
    /// Share of meaningful lines the classifier could not place.
    pub fn skip_ratio(&self) -> f64 {
        let seen = self.classified_lines + self.skipped_lines;
        if seen == 0 {
            0.0
        } else {
            self.skipped_lines as f64 / seen as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseOutput {
    pub root: SyntaxNode,
    pub stats: ParseStats,
}

#[derive(Debug, Clone, Copy)]
pub struct StructuralParser {
    max_depth: usize,
}

impl Default for StructuralParser {
    fn default() -> Self {
        Self {
            max_depth: MAX_NESTING_DEPTH,
        }
    }
}

/// Loop variables of the enclosing loops, innermost last.
#[derive(Debug, Clone, Default)]
struct Scope {
    outer_vars: Vec<String>,
    depth: usize,
}

impl Scope {
    fn nested(&self, loop_var: Option<String>) -> Self {
        let mut outer_vars = self.outer_vars.clone();
        outer_vars.extend(loop_var);
        Self {
            outer_vars,
            depth: self.depth + 1,
        }
    }
}

impl StructuralParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn parse(&self, source: &NormalizedSource) -> ParseOutput {
        let mut stats = ParseStats {
            total_lines: source.lines.len(),
            ..ParseStats::default()
        };

        let children = match source.lines.len() {
            0 => Vec::new(),
            n => self.parse_range(source, 0, n - 1, &Scope::default(), &mut stats),
        };

        let last_line = source.lines.last().map_or(1, |l| l.number);
        let mut root = SyntaxNode::new(NodeKind::Program, LineRange::new(1, last_line));
        root.complexity = program_complexity(&children, &stats);
        root.children = children;

        tracing::debug!(
            total_lines = stats.total_lines,
            classified = stats.classified_lines,
            skipped = stats.skipped_lines,
            unbalanced = stats.unbalanced_blocks,
            time = %root.complexity.time,
            "structural parse complete"
        );

        ParseOutput { root, stats }
    }

    fn parse_range(
        &self,
        source: &NormalizedSource,
        start: usize,
        end: usize,
        scope: &Scope,
        stats: &mut ParseStats,
    ) -> Vec<SyntaxNode> {
        let lines = &source.lines;
        let mut nodes = Vec::new();
        let mut i = start;

        while i <= end {
            let line = &lines[i];
            if line.is_blank() {
                i += 1;
                continue;
            }

            let Some(classified) = classify_line(&line.code) else {
                if !is_structural_noise(&line.code) {
                    stats.skipped_lines += 1;
                }
                i += 1;
                continue;
            };
            stats.classified_lines += 1;

            if !classified.kind.opens_block() {
                nodes.push(leaf(line, classified.kind, classified.name));
                i += 1;
                continue;
            }

            let span = block_end(lines, i, end);
            if !span.balanced {
                stats.unbalanced_blocks += 1;
            }
            let range = LineRange::new(line.number, lines[span.end].number);

            let node = match classified.kind {
                NodeKind::Loop => {
                    let child_scope = scope.nested(classify::loop_variable(&line.code));
                    let children = self.parse_body(source, i, span.end, &child_scope, stats);
                    build_loop(source, i, span.end, range, children, scope)
                }
                NodeKind::Function => {
                    let children =
                        self.parse_body(source, i, span.end, &scope.nested(None), stats);
                    build_function(source, i, span.end, range, classified.name, children)
                }
                _ => {
                    let children =
                        self.parse_body(source, i, span.end, &scope.nested(None), stats);
                    build_conditional(range, classified.name, children)
                }
            };
            nodes.push(node);
            i = span.end + 1;
        }

        nodes
    }

    fn parse_body(
        &self,
        source: &NormalizedSource,
        header: usize,
        end: usize,
        scope: &Scope,
        stats: &mut ParseStats,
    ) -> Vec<SyntaxNode> {
        if end <= header || scope.depth > self.max_depth {
            return Vec::new();
        }
        self.parse_range(source, header + 1, end, scope, stats)
    }
}

/// Parse raw text with default settings.
pub fn parse_source(text: &str) -> ParseOutput {
    StructuralParser::default().parse(&NormalizedSource::new(text))
}

/// Lines that carry block punctuation only.
fn is_structural_noise(code: &str) -> bool {
    let word = code
        .trim_matches(|c: char| matches!(c, '{' | '}' | '(' | ')' | ';' | ',') || c.is_whitespace())
        .trim_end_matches(':');
    matches!(
        word,
        "" | "else" | "try" | "finally" | "pass" | "break" | "continue" | "end" | "do" | "default"
    )
}

fn leaf(line: &NormalizedLine, kind: NodeKind, name: Option<String>) -> SyntaxNode {
    let range = LineRange::new(line.number, line.number);
    let mut node = SyntaxNode::new(kind, range);
    node.name = name;

    let library = library_call_growth(&line.code);
    node.complexity = match (kind, library) {
        (NodeKind::Call | NodeKind::Variable | NodeKind::Return, Some(time)) => {
            ComplexityInfo::new(time, GrowthClass::Const, 0.85).with_factor("library-sort")
        }
        (NodeKind::Call | NodeKind::Variable | NodeKind::Return, None)
            if has_inline_iteration(&line.code) =>
        {
            ComplexityInfo::new(GrowthClass::Linear, GrowthClass::Const, 0.85)
                .with_factor("inline-iteration")
        }
        (NodeKind::Call, None) => {
            ComplexityInfo::new(GrowthClass::Const, GrowthClass::Const, 0.9).with_factor("call")
        }
        _ => ComplexityInfo::constant(),
    };

    if kind == NodeKind::Variable {
        if let Some(container) = container_kind(&line.code) {
            node.metadata.container = Some(container);
            node.complexity.space = container.space();
            node.complexity = node.complexity.with_factor("container");
        }
    }
    node
}

struct ChildSummary {
    time: GrowthClass,
    space: GrowthClass,
    min_confidence: f64,
    exact: bool,
}

fn summarize(children: &[SyntaxNode]) -> ChildSummary {
    ChildSummary {
        time: GrowthClass::max_of(children.iter().map(|c| c.complexity.time)),
        space: GrowthClass::max_of(children.iter().map(|c| c.complexity.space)),
        min_confidence: children
            .iter()
            .map(|c| c.complexity.confidence)
            .reduce(f64::min)
            .unwrap_or(1.0),
        exact: children.iter().all(|c| c.complexity.exact),
    }
}

fn body_codes(source: &NormalizedSource, header: usize, end: usize) -> Vec<&str> {
    source.lines[(header + 1).min(end + 1)..=end]
        .iter()
        .map(|l| l.code.as_str())
        .filter(|c| !c.is_empty())
        .collect()
}

fn build_loop(
    source: &NormalizedSource,
    header: usize,
    end: usize,
    range: LineRange,
    children: Vec<SyntaxNode>,
    scope: &Scope,
) -> SyntaxNode {
    let code = &source.lines[header].code;
    let kind = loop_kind(code);
    let body = body_codes(source, header, end);
    let iteration = iteration_pattern(code, &body, &scope.outer_vars);
    let inner = summarize(&children);

    let base = match kind {
        LoopKind::Counting | LoopKind::ForEach => 0.9,
        LoopKind::While | LoopKind::DoWhile => 0.75,
        LoopKind::Unbounded => 0.5,
    };

    let mut info = ComplexityInfo::new(
        iteration.growth().multiply(inner.time),
        inner.space,
        base * (0.8 + 0.2 * inner.min_confidence),
    )
    .with_factor("loop");
    info.exact = matches!(kind, LoopKind::Counting | LoopKind::ForEach) && inner.exact;

    info = match iteration {
        crate::core::IterationPattern::Halving => info.with_factor("halving"),
        crate::core::IterationPattern::SquareRoot => info.with_factor("sqrt-bound"),
        crate::core::IterationPattern::DependentIndex => info.with_factor("dependent-index"),
        crate::core::IterationPattern::QuadraticBound => info.with_factor("quadratic-bound"),
        crate::core::IterationPattern::Constant => info.with_factor("constant-bound"),
        crate::core::IterationPattern::Linear => info,
    };
    if kind == LoopKind::Unbounded {
        info = info.with_factor("unbounded-loop");
    }
    if children.iter().any(|c| c.loop_depth() > 0) {
        info = info.with_factor("nested-loop");
    }

    let mut node = SyntaxNode::new(NodeKind::Loop, range);
    node.metadata.loop_kind = Some(kind);
    node.metadata.iteration = Some(iteration);
    node.complexity = info;
    node.children = children;
    node
}

fn build_conditional(
    range: LineRange,
    name: Option<String>,
    children: Vec<SyntaxNode>,
) -> SyntaxNode {
    let inner = summarize(&children);
    let mut info =
        ComplexityInfo::new(inner.time, inner.space, inner.min_confidence).with_factor("branch");
    info.exact = inner.exact;

    let mut node = SyntaxNode::new(NodeKind::Conditional, range);
    node.name = name;
    node.complexity = info;
    node.children = children;
    node
}

fn build_function(
    source: &NormalizedSource,
    header: usize,
    end: usize,
    range: LineRange,
    name: Option<String>,
    children: Vec<SyntaxNode>,
) -> SyntaxNode {
    let inner = summarize(&children);
    let body = body_codes(source, header, end).join("\n");
    let sites = name
        .as_deref()
        .map_or(0, |n| count_self_calls(&body, n));

    let info = if sites == 0 {
        let mut info = ComplexityInfo::new(
            inner.time,
            inner.space,
            0.9 * (0.8 + 0.2 * inner.min_confidence),
        );
        info.exact = inner.exact;
        info
    } else {
        let lowered = source.lowered_range(header + 1, end);
        let halving = has_halving_evidence(&lowered);
        let merge_like = has_merge_step(&lowered) || inner.time >= GrowthClass::Linear;
        let shape = classify_recursion(sites, halving, merge_like);

        let time = match shape.kind {
            RecursionKind::Linear => shape.time.multiply(inner.time),
            _ => shape.time.max(inner.time),
        };
        let tag = match shape.kind {
            RecursionKind::DivideAndConquer => "divide-and-conquer",
            RecursionKind::BinaryTree => "binary-recursion",
            RecursionKind::Linear => "linear-recursion",
            RecursionKind::None => "recursion",
        };
        ComplexityInfo::new(
            time,
            shape.depth.max(inner.space),
            shape.confidence * (0.8 + 0.2 * inner.min_confidence),
        )
        .with_factor("recursion")
        .with_factor(tag)
    };

    let mut node = SyntaxNode::new(NodeKind::Function, range);
    node.name = name;
    node.metadata.is_recursive = sites > 0;
    node.metadata.recursive_calls = sites;
    node.complexity = info;
    node.children = children;
    node
}

fn program_complexity(children: &[SyntaxNode], stats: &ParseStats) -> ComplexityInfo {
    let inner = summarize(children);
    let mean = if children.is_empty() {
        1.0
    } else {
        children.iter().map(|c| c.complexity.confidence).sum::<f64>() / children.len() as f64
    };

    let mut info = ComplexityInfo::new(inner.time, inner.space, mean);
    info.exact = inner.exact;
    if stats.unbalanced_blocks > 0 {
        info.confidence *= 0.8;
        info = info.with_factor("unbalanced-braces");
    }
    if stats.skip_ratio() > 0.5 {
        info.confidence *= 0.9;
        info = info.with_factor("low-coverage");
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn nested_loops(depth: usize) -> String {
        let mut src = String::from("void walk(int n) {\n");
        for d in 0..depth {
            src.push_str(&format!(
                "{}for (int i{d} = 0; i{d} < n; i{d}++) {{\n",
                "  ".repeat(d + 1)
            ));
        }
        src.push_str(&format!("{}total++;\n", "  ".repeat(depth + 1)));
        for d in (0..depth).rev() {
            src.push_str(&format!("{}}}\n", "  ".repeat(d + 1)));
        }
        src.push_str("}\n");
        src
    }

    #[test]
    fn test_nested_counting_loops_map_to_lattice_position() {
        let expected = [
            GrowthClass::Const,
            GrowthClass::Linear,
            GrowthClass::Quadratic,
            GrowthClass::Cubic,
            GrowthClass::Cubic,
        ];
        for (depth, class) in expected.into_iter().enumerate() {
            let out = parse_source(&nested_loops(depth));
            assert_eq!(out.root.complexity.time, class, "depth {depth}");
            assert_eq!(out.root.count(NodeKind::Loop), depth);
            assert_eq!(out.stats.unbalanced_blocks, 0);
        }
    }

    #[test]
    fn test_bubble_sort_is_quadratic_with_constant_space() {
        let out = parse_source(indoc! {"
            def bubble_sort(arr):
                n = len(arr)
                for i in range(n):
                    for j in range(0, n - i - 1):
                        if arr[j] > arr[j + 1]:
                            arr[j], arr[j + 1] = arr[j + 1], arr[j]
                return arr
        "});

        let function = &out.root.children[0];
        assert_eq!(function.kind, NodeKind::Function);
        assert_eq!(function.name.as_deref(), Some("bubble_sort"));
        assert!(!function.metadata.is_recursive);
        assert_eq!(function.complexity.time, GrowthClass::Quadratic);
        assert_eq!(function.complexity.space, GrowthClass::Const);
        assert_eq!(function.lines, LineRange::new(1, 7));

        let inner = &function.children[1].children[0];
        assert_eq!(
            inner.metadata.iteration,
            Some(crate::core::IterationPattern::DependentIndex)
        );
    }

    #[test]
    fn test_binary_search_loop_is_logarithmic() {
        let out = parse_source(indoc! {"
            def binary_search(arr, target):
                lo, hi = 0, len(arr) - 1
                while lo <= hi:
                    mid = (lo + hi) // 2
                    if arr[mid] == target:
                        return mid
                    elif arr[mid] < target:
                        lo = mid + 1
                    else:
                        hi = mid - 1
                return -1
        "});
        assert_eq!(out.root.complexity.time, GrowthClass::Log);
        assert!(out.root.children[0].children.iter().any(|c| c
            .complexity
            .factors
            .contains(&"halving".to_string())));
    }

    #[test]
    fn test_recursive_functions_route_through_shape_classifier() {
        let fib = parse_source(indoc! {"
            def fib(n):
                if n < 2:
                    return n
                return fib(n - 1) + fib(n - 2)
        "});
        let f = &fib.root.children[0];
        assert!(f.metadata.is_recursive);
        assert_eq!(f.metadata.recursive_calls, 2);
        assert_eq!(f.complexity.time, GrowthClass::Exponential);
        assert_eq!(f.complexity.space, GrowthClass::Linear);

        let merge = parse_source(indoc! {"
            def merge_sort(arr):
                if len(arr) <= 1:
                    return arr
                mid = len(arr) // 2
                left = merge_sort(arr[:mid])
                right = merge_sort(arr[mid:])
                return merge(left, right)
        "});
        let m = &merge.root.children[0];
        assert_eq!(m.complexity.time, GrowthClass::Linearithmic);
        assert_eq!(m.complexity.space, GrowthClass::Linear);

        let countdown = parse_source("fn countdown(n: u32) {\n    if n > 0 {\n        countdown(n - 1);\n    }\n}\n");
        assert_eq!(countdown.root.complexity.time, GrowthClass::Linear);
    }

    #[test]
    fn test_declaration_line_is_not_a_self_call() {
        let out = parse_source("int square(int x) {\n    return x * x;\n}\n");
        let f = &out.root.children[0];
        assert!(!f.metadata.is_recursive);
        assert_eq!(f.complexity.time, GrowthClass::Const);
    }

    #[test]
    fn test_library_sort_and_containers() {
        let out = parse_source(indoc! {"
            fn dedupe(items: &[u32]) -> Vec<u32> {
                let mut out = items.to_vec();
                out.sort();
                out
            }
        "});
        assert_eq!(out.root.complexity.time, GrowthClass::Linearithmic);
        assert_eq!(out.root.complexity.space, GrowthClass::Linear);
    }

    #[test]
    fn test_malformed_input_degrades_instead_of_failing() {
        let out = parse_source("fn broken() {\n    for x in items {\n        work(x);\n");
        assert_eq!(out.stats.unbalanced_blocks, 2);
        assert_eq!(out.root.complexity.time, GrowthClass::Linear);
        assert!(out.root.complexity.confidence < 0.8);
        assert!(out
            .root
            .complexity
            .factors
            .contains(&"unbalanced-braces".to_string()));
    }

    #[test]
    fn test_empty_input_is_constant() {
        let out = parse_source("");
        assert!(out.root.children.is_empty());
        assert_eq!(out.root.complexity.time, GrowthClass::Const);
        assert_eq!(out.root.complexity.space, GrowthClass::Const);
        assert_eq!(out.root.complexity.confidence, 1.0);
    }

    #[test]
    fn test_structural_noise_is_not_counted_as_skipped() {
        let out = parse_source("if (a) {\n  run();\n} else {\n  stop();\n}\n");
        assert_eq!(out.stats.skipped_lines, 0);
        assert_eq!(out.stats.classified_lines, 3);
    }

    #[test]
    fn test_depth_limit_keeps_deep_blocks_opaque() {
        let parser = StructuralParser::new().with_max_depth(1);
        let out = parser.parse(&NormalizedSource::new(&nested_loops(3)));
        assert!(out.root.count(NodeKind::Loop) < 3);
    }
}
