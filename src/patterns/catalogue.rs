//! Named-algorithm catalogue.
//!
//! Each entry is a conjunction of small predicates over [`Evidence`].
//! All predicates must hold for a match; there is no partial credit.

use super::evidence::Evidence;
use crate::core::{AlgorithmMatch, CaseSplit, GrowthClass};

use GrowthClass::{Const, Linear, Linearithmic, Log, Quadratic};

type Predicate = (&'static str, fn(&Evidence) -> bool);

#[derive(Debug, Clone, Copy)]
pub enum TimeRule {
    Fixed(GrowthClass),
    /// One linear factor per nested loop level, saturating at cubic
    LoopDepth,
}

#[derive(Debug, Clone, Copy)]
pub enum SpaceRule {
    Fixed(GrowthClass),
    /// Quadratic for a two-dimensional table, otherwise linear
    Table,
}

#[derive(Clone, Copy)]
pub struct CatalogueEntry {
    pub name: &'static str,
    pub time: TimeRule,
    pub space: SpaceRule,
    /// Best, average and worst; `None` means uniform
    pub cases: Option<(GrowthClass, GrowthClass, GrowthClass)>,
    pub confidence: f64,
    /// Function-name fragments used to locate the match
    pub hints: &'static [&'static str],
    pub predicates: &'static [Predicate],
}

fn merge_helper(e: &Evidence) -> bool {
    e.merge_helper
}
fn no_merge_helper(e: &Evidence) -> bool {
    !e.merge_helper
}
fn midpoint(e: &Evidence) -> bool {
    e.midpoint
}
fn no_midpoint(e: &Evidence) -> bool {
    !e.midpoint
}
fn multi_recursion(e: &Evidence) -> bool {
    e.max_recursive_calls >= 2
}
fn below_multi_recursion(e: &Evidence) -> bool {
    e.max_recursive_calls < 2
}
fn any_recursion(e: &Evidence) -> bool {
    e.max_recursive_calls >= 1
}
fn no_recursion(e: &Evidence) -> bool {
    e.max_recursive_calls == 0
}
fn aux_buffer(e: &Evidence) -> bool {
    e.aux_buffer
}
fn bounds_identifiers(e: &Evidence) -> bool {
    e.bounds_identifiers
}
fn pivot(e: &Evidence) -> bool {
    e.pivot
}
fn swap_or_buffer(e: &Evidence) -> bool {
    e.swap || e.aux_buffer
}
fn swap(e: &Evidence) -> bool {
    e.swap
}
fn heapify(e: &Evidence) -> bool {
    e.heapify
}
fn heap_child_index(e: &Evidence) -> bool {
    e.heap_child_index
}
fn nested_loops(e: &Evidence) -> bool {
    e.loop_depth >= 2
}
fn single_loop(e: &Evidence) -> bool {
    e.loop_depth == 1
}
fn adjacent_comparison(e: &Evidence) -> bool {
    e.adjacent_comparison
}
fn insertion_key(e: &Evidence) -> bool {
    e.insertion_key
}
fn insertion_shift(e: &Evidence) -> bool {
    e.insertion_shift
}
fn midpoint_update(e: &Evidence) -> bool {
    e.midpoint_update
}
fn bisection_driver(e: &Evidence) -> bool {
    e.bisection_loop || e.max_recursive_calls == 1
}
fn equality_search(e: &Evidence) -> bool {
    e.equality_search
}
fn early_exit(e: &Evidence) -> bool {
    e.early_exit
}
fn visited(e: &Evidence) -> bool {
    e.visited
}
fn adjacency(e: &Evidence) -> bool {
    e.adjacency
}
fn queue(e: &Evidence) -> bool {
    e.queue
}
fn no_queue(e: &Evidence) -> bool {
    !e.queue
}
fn stack_or_recursion(e: &Evidence) -> bool {
    e.stack || e.max_recursive_calls >= 1
}
fn priority_queue(e: &Evidence) -> bool {
    e.priority_queue
}
fn no_priority_queue(e: &Evidence) -> bool {
    !e.priority_queue
}
fn distances(e: &Evidence) -> bool {
    e.distances
}
fn memo_table(e: &Evidence) -> bool {
    e.memo_table
}
fn loop_or_recursion(e: &Evidence) -> bool {
    e.loop_depth >= 1 || e.max_recursive_calls >= 1
}
fn tree_children(e: &Evidence) -> bool {
    e.tree_children
}

pub const CATALOGUE: &[CatalogueEntry] = &[
    CatalogueEntry {
        name: "Merge Sort",
        time: TimeRule::Fixed(Linearithmic),
        space: SpaceRule::Fixed(Linear),
        cases: None,
        confidence: 0.9,
        hints: &["merge", "sort"],
        predicates: &[
            ("merge-helper", merge_helper),
            ("halving-midpoint", midpoint),
            ("multiple-recursive-calls", multi_recursion),
            ("auxiliary-buffer", aux_buffer),
            ("bounds-identifiers", bounds_identifiers),
        ],
    },
    CatalogueEntry {
        name: "Quick Sort",
        time: TimeRule::Fixed(Linearithmic),
        space: SpaceRule::Fixed(Log),
        cases: Some((Linearithmic, Linearithmic, Quadratic)),
        confidence: 0.85,
        hints: &["quick", "sort"],
        predicates: &[
            ("pivot-partition", pivot),
            ("multiple-recursive-calls", multi_recursion),
            ("swap-or-buffer", swap_or_buffer),
            ("no-merge-helper", no_merge_helper),
        ],
    },
    CatalogueEntry {
        name: "Heap Sort",
        time: TimeRule::Fixed(Linearithmic),
        space: SpaceRule::Fixed(Const),
        cases: None,
        confidence: 0.85,
        hints: &["heap", "sort"],
        predicates: &[
            ("heapify", heapify),
            ("heap-child-index", heap_child_index),
            ("swap", swap),
        ],
    },
    CatalogueEntry {
        name: "Bubble Sort",
        time: TimeRule::Fixed(Quadratic),
        space: SpaceRule::Fixed(Const),
        cases: Some((Linear, Quadratic, Quadratic)),
        confidence: 0.9,
        hints: &["bubble", "sort"],
        predicates: &[
            ("nested-loops", nested_loops),
            ("adjacent-comparison", adjacent_comparison),
            ("swap", swap),
            ("no-recursion", no_recursion),
        ],
    },
    CatalogueEntry {
        name: "Insertion Sort",
        time: TimeRule::Fixed(Quadratic),
        space: SpaceRule::Fixed(Const),
        cases: Some((Linear, Quadratic, Quadratic)),
        confidence: 0.85,
        hints: &["insertion", "sort"],
        predicates: &[
            ("nested-loops", nested_loops),
            ("key-element", insertion_key),
            ("shift-right", insertion_shift),
            ("no-recursion", no_recursion),
        ],
    },
    CatalogueEntry {
        name: "Binary Search",
        time: TimeRule::Fixed(Log),
        space: SpaceRule::Fixed(Const),
        cases: Some((Const, Log, Log)),
        confidence: 0.9,
        hints: &["binary", "search", "bisect"],
        predicates: &[
            ("halving-midpoint", midpoint),
            ("midpoint-update", midpoint_update),
            ("bounds-identifiers", bounds_identifiers),
            ("bisection-driver", bisection_driver),
            ("no-merge-helper", no_merge_helper),
            ("at-most-one-recursive-call", below_multi_recursion),
        ],
    },
    CatalogueEntry {
        name: "Linear Search",
        time: TimeRule::Fixed(Linear),
        space: SpaceRule::Fixed(Const),
        cases: Some((Const, Linear, Linear)),
        confidence: 0.75,
        hints: &["search", "find", "index"],
        predicates: &[
            ("single-loop", single_loop),
            ("equality-test", equality_search),
            ("early-exit", early_exit),
            ("no-midpoint", no_midpoint),
            ("no-recursion", no_recursion),
        ],
    },
    CatalogueEntry {
        name: "Depth-First Search",
        time: TimeRule::Fixed(Linear),
        space: SpaceRule::Fixed(Linear),
        cases: None,
        confidence: 0.8,
        hints: &["dfs", "depth"],
        predicates: &[
            ("visited-set", visited),
            ("adjacency", adjacency),
            ("stack-or-recursion", stack_or_recursion),
            ("no-queue", no_queue),
            ("no-priority-queue", no_priority_queue),
        ],
    },
    CatalogueEntry {
        name: "Breadth-First Search",
        time: TimeRule::Fixed(Linear),
        space: SpaceRule::Fixed(Linear),
        cases: None,
        confidence: 0.8,
        hints: &["bfs", "breadth"],
        predicates: &[
            ("visited-set", visited),
            ("adjacency", adjacency),
            ("queue", queue),
            ("no-priority-queue", no_priority_queue),
        ],
    },
    CatalogueEntry {
        name: "Dijkstra",
        time: TimeRule::Fixed(Linearithmic),
        space: SpaceRule::Fixed(Linear),
        cases: None,
        confidence: 0.8,
        hints: &["dijkstra", "shortest", "path"],
        predicates: &[
            ("priority-queue", priority_queue),
            ("distance-table", distances),
            ("adjacency", adjacency),
        ],
    },
    CatalogueEntry {
        name: "Dynamic Programming",
        time: TimeRule::LoopDepth,
        space: SpaceRule::Table,
        cases: None,
        confidence: 0.75,
        hints: &["dp", "memo", "fib", "knapsack", "lcs"],
        predicates: &[
            ("memo-table", memo_table),
            ("loop-or-recursion", loop_or_recursion),
        ],
    },
    CatalogueEntry {
        name: "Tree Traversal",
        time: TimeRule::Fixed(Linear),
        space: SpaceRule::Fixed(Log),
        cases: None,
        confidence: 0.8,
        hints: &["order", "traverse", "visit", "walk", "tree"],
        predicates: &[
            ("child-links", tree_children),
            ("recursion", any_recursion),
        ],
    },
];

impl CatalogueEntry {
    /// Evaluate every predicate; a match carries the tags of all of them.
    pub fn evaluate(&self, evidence: &Evidence) -> Option<AlgorithmMatch> {
        if !self.predicates.iter().all(|(_, holds)| holds(evidence)) {
            return None;
        }

        let time = match self.time {
            TimeRule::Fixed(class) => class,
            TimeRule::LoopDepth => match evidence.loop_depth {
                0 | 1 => Linear,
                2 => Quadratic,
                _ => GrowthClass::Cubic,
            },
        };
        let space = match self.space {
            SpaceRule::Fixed(class) => class,
            SpaceRule::Table if evidence.table_2d => Quadratic,
            SpaceRule::Table => Linear,
        };
        let cases = self
            .cases
            .map_or(CaseSplit::uniform(time), |(b, a, w)| CaseSplit::new(b, a, w));

        Some(AlgorithmMatch {
            name: self.name.to_string(),
            time,
            space,
            cases,
            confidence: self.confidence,
            evidence: self.predicates.iter().map(|(tag, _)| tag.to_string()).collect(),
            lines: evidence.locate(self.hints),
        })
    }
}

/// Case split recorded for a catalogue name.
pub fn case_split_for(name: &str) -> Option<CaseSplit> {
    CATALOGUE
        .iter()
        .find(|e| e.name == name)
        .and_then(|e| e.cases)
        .map(|(b, a, w)| CaseSplit::new(b, a, w))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> &'static CatalogueEntry {
        CATALOGUE.iter().find(|e| e.name == name).unwrap()
    }

    #[test]
    fn test_catalogue_covers_twelve_algorithms() {
        assert_eq!(CATALOGUE.len(), 12);
        let mut names: Vec<_> = CATALOGUE.iter().map(|e| e.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn test_all_predicates_must_hold() {
        let mut e = Evidence {
            loop_depth: 2,
            adjacent_comparison: true,
            ..Evidence::default()
        };
        assert!(entry("Bubble Sort").evaluate(&e).is_none());
        e.swap = true;
        let m = entry("Bubble Sort").evaluate(&e).unwrap();
        assert_eq!(m.time, Quadratic);
        assert_eq!(m.space, Const);
        assert_eq!(m.cases.best, Linear);
        assert_eq!(m.evidence.len(), 4);
    }

    #[test]
    fn test_dynamic_programming_scales_with_loops_and_table() {
        let mut e = Evidence {
            memo_table: true,
            loop_depth: 2,
            table_2d: true,
            ..Evidence::default()
        };
        let m = entry("Dynamic Programming").evaluate(&e).unwrap();
        assert_eq!((m.time, m.space), (Quadratic, Quadratic));

        e.loop_depth = 0;
        e.max_recursive_calls = 2;
        e.table_2d = false;
        let m = entry("Dynamic Programming").evaluate(&e).unwrap();
        assert_eq!((m.time, m.space), (Linear, Linear));
    }

    #[test]
    fn test_case_split_lookup() {
        assert_eq!(
            case_split_for("Quick Sort"),
            Some(CaseSplit::new(Linearithmic, Linearithmic, Quadratic))
        );
        assert_eq!(case_split_for("Merge Sort"), None);
        assert_eq!(case_split_for("Nope"), None);
    }
}
