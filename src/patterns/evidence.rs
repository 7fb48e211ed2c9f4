//! Evidence gathered once per input for the catalogue predicates.
//!
//! Every field is a cheap yes/no (or small count) observation over the
//! normalized text and the structural tree. Catalogue entries combine
//! them; nothing here knows about algorithm names.

use super::recursion::has_halving_evidence;
use crate::core::{LineRange, NodeKind, SyntaxNode};
use crate::parser::classify::{has_midpoint, is_bisection_header};
use crate::parser::normalize::NormalizedSource;
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSpan {
    pub name: String,
    pub lines: LineRange,
    pub recursive_calls: usize,
    pub loop_depth: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evidence {
    pub functions: Vec<FunctionSpan>,
    pub max_recursive_calls: usize,
    pub loop_depth: usize,
    pub merge_helper: bool,
    pub midpoint: bool,
    pub halving: bool,
    pub aux_buffer: bool,
    pub bounds_identifiers: bool,
    pub adjacent_comparison: bool,
    pub swap: bool,
    pub pivot: bool,
    pub heapify: bool,
    pub heap_child_index: bool,
    pub insertion_key: bool,
    pub insertion_shift: bool,
    pub bisection_loop: bool,
    pub midpoint_update: bool,
    pub equality_search: bool,
    /// A `return` or `break` inside some loop body
    pub early_exit: bool,
    pub visited: bool,
    pub adjacency: bool,
    pub queue: bool,
    pub stack: bool,
    pub priority_queue: bool,
    pub distances: bool,
    pub memo_table: bool,
    pub table_2d: bool,
    pub tree_children: bool,
}

static MERGE_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(merge\w*)\s*\(").unwrap());

static APPEND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.(?:append|push|push_back|extend|add|concat)\s*\(").unwrap()
});

static ADJACENT_NEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\s*(\w+)\s*\]\s*[<>]=?\s*\w+\[\s*(\w+)\s*\+\s*1\s*\]").unwrap()
});

static ADJACENT_PREV: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\s*(\w+)\s*-\s*1\s*\]\s*[<>]=?\s*\w+\[\s*(\w+)\s*\]").unwrap()
});

static SWAP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\w+\[[^\]]+\]\s*,\s*\w+\[[^\]]+\]\s*=\s*\w+\[[^\]]+\]\s*,\s*\w+\[[^\]]+\]|\[\s*\w+\[[^\]]+\]\s*,\s*\w+\[[^\]]+\]\s*\]\s*=|\bswap\s*\(|\.swap\s*\(|\b(?:temp|tmp|t)\s*=\s*\w+\[",
    )
    .unwrap()
});

static HEAPIFY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w*heapify\w*\s*\(|\bsift_?down\s*\(|\bsink\s*\(").unwrap());

static HEAP_CHILD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"2\s*\*\s*\w+\s*\+\s*[12]\b|\b\w+\s*\*\s*2\s*\+\s*[12]\b|<<\s*1\s*\)?\s*\+\s*1").unwrap()
});

static INSERTION_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:key|current|cur|val|value|item|elem|x)\s*=\s*\w+\[\s*\w+\s*\]").unwrap()
});

static INSERTION_SHIFT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\w+\[\s*(\w+)\s*\+\s*1\s*\]\s*=\s*\w+\[\s*(\w+)\s*\]").unwrap()
});

static MIDPOINT_UPDATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:lo|low|left|l|start|begin|hi|high|right|r|end)\s*=\s*mid\w*\s*(?:[+-]\s*1\b|;|$)")
        .unwrap()
});

static EQUALITY_SEARCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"===?\s*(?:target|key|needle|value|val|item|x|elem|query|search\w*)\b|\b(?:target|key|needle|query)\s*===?|\[\s*\w+\s*\]\s*===?\s*\w+",
    )
    .unwrap()
});

static MEMO_ACCESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:dp|memo|cache|table)\w*\s*\[|\bin\s+memo\b|@(?:functools\.)?(?:lru_)?cache\b|\bmemo\w*\.(?:get|contains_key|has|contains)\s*\(")
        .unwrap()
});

static TABLE_2D: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:dp|memo|table)\w*\s*\[[^\]]*\]\s*\[").unwrap());

static LEFT_CHILD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\.|->)left\b").unwrap());
static RIGHT_CHILD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\.|->)right\b").unwrap());

static TAKE_FRONT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.shift\s*\(\s*\)|\.pop\s*\(\s*0\s*\)").unwrap());

impl Evidence {
    pub fn collect(source: &NormalizedSource, root: &SyntaxNode) -> Self {
        let text = source.lowered();
        let lines: Vec<&str> = text.split('\n').collect();
        let nodes = root.walk();

        let functions: Vec<FunctionSpan> = nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Function)
            .map(|n| FunctionSpan {
                name: n.name.clone().unwrap_or_default(),
                lines: n.lines,
                recursive_calls: n.metadata.recursive_calls,
                loop_depth: n.loop_depth(),
            })
            .collect();

        let early_exit = nodes.iter().filter(|n| n.kind == NodeKind::Loop).any(|n| {
            let body = source.lowered_range(n.lines.start, n.lines.end.saturating_sub(1));
            body.split(|c: char| !(c.is_alphanumeric() || c == '_'))
                .any(|tok| tok == "return" || tok == "break")
        });

        let has = |idents: &[&str]| source.has_any_identifier(idents);
        let same_index = |re: &Regex| {
            re.captures_iter(text)
                .any(|c| c.get(1).map(|m| m.as_str()) == c.get(2).map(|m| m.as_str()))
        };

        Self {
            max_recursive_calls: functions
                .iter()
                .map(|f| f.recursive_calls)
                .max()
                .unwrap_or(0),
            functions,
            loop_depth: root.loop_depth(),
            merge_helper: MERGE_CALL
                .captures_iter(text)
                .filter_map(|c| c.get(1))
                .any(|m| !m.as_str().contains("sort")),
            midpoint: lines.iter().any(|l| has_midpoint(l)),
            halving: has_halving_evidence(text),
            aux_buffer: nodes.iter().any(|n| n.metadata.container.is_some())
                || APPEND.is_match(text),
            bounds_identifiers: (has(&["left"]) && has(&["right"]))
                || (has(&["low"]) && has(&["high"]))
                || (has(&["lo"]) && has(&["hi"]))
                || has(&["mid"]),
            adjacent_comparison: same_index(&ADJACENT_NEXT) || same_index(&ADJACENT_PREV),
            swap: SWAP.is_match(text),
            pivot: has(&["pivot"]) || text.contains("partition("),
            heapify: HEAPIFY.is_match(text),
            heap_child_index: HEAP_CHILD.is_match(text),
            insertion_key: INSERTION_KEY.is_match(text),
            insertion_shift: same_index(&INSERTION_SHIFT),
            bisection_loop: lines.iter().any(|l| is_bisection_header(l)),
            midpoint_update: lines.iter().any(|l| MIDPOINT_UPDATE.is_match(l)),
            equality_search: EQUALITY_SEARCH.is_match(text),
            early_exit,
            visited: has(&["visited", "seen", "marked", "explored", "discovered"]),
            adjacency: has(&[
                "graph", "adj", "adjacency", "adj_list", "adjlist", "neighbors", "neighbours",
                "edges",
            ]),
            queue: has(&["queue", "deque", "popleft", "pop_front", "vecdeque", "arraydeque"])
                || TAKE_FRONT.is_match(text),
            stack: has(&["stack"]),
            priority_queue: has(&[
                "heapq", "heappush", "heappop", "priorityqueue", "priority_queue", "binaryheap",
                "min_heap", "minheap", "pq",
            ]),
            distances: has(&["dist", "distance", "distances", "dists"]),
            memo_table: MEMO_ACCESS.is_match(text),
            table_2d: TABLE_2D.is_match(text)
                || nodes.iter().any(|n| {
                    n.metadata.container == Some(crate::core::ContainerKind::Matrix)
                }),
            tree_children: LEFT_CHILD.is_match(text) && RIGHT_CHILD.is_match(text),
        }
    }

    /// Span of the first function whose name contains any hint, falling
    /// back to the first function.
    pub fn locate(&self, hints: &[&str]) -> Option<LineRange> {
        self.functions
            .iter()
            .find(|f| {
                let name = f.name.to_ascii_lowercase();
                hints.iter().any(|h| name.contains(h))
            })
            .or_else(|| self.functions.first())
            .map(|f| f.lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::StructuralParser;
    use indoc::indoc;

    fn evidence(src: &str) -> Evidence {
        let norm = NormalizedSource::new(src);
        let parsed = StructuralParser::default().parse(&norm);
        Evidence::collect(&norm, &parsed.root)
    }

    #[test]
    fn test_sorting_evidence() {
        let e = evidence(indoc! {"
            def bubble_sort(arr):
                for i in range(len(arr)):
                    for j in range(len(arr) - i - 1):
                        if arr[j] > arr[j + 1]:
                            arr[j], arr[j + 1] = arr[j + 1], arr[j]
        "});
        assert!(e.adjacent_comparison);
        assert!(e.swap);
        assert_eq!(e.loop_depth, 2);
        assert_eq!(e.max_recursive_calls, 0);
        assert!(!e.insertion_shift);
    }

    #[test]
    fn test_merge_helper_excludes_the_sort_itself() {
        let only_sort = evidence("def merge_sort(a):\n    return merge_sort(a[1:])\n");
        assert!(!only_sort.merge_helper);
        let helper = evidence("def merge(a, b):\n    return a + b\n");
        assert!(helper.merge_helper);
    }

    #[test]
    fn test_bisection_evidence() {
        let e = evidence(indoc! {"
            int search(int* a, int n, int t) {
                int lo = 0, hi = n - 1;
                while (lo <= hi) {
                    int mid = lo + (hi - lo) / 2;
                    if (a[mid] == t) return mid;
                    if (a[mid] < t) lo = mid + 1;
                    else hi = mid - 1;
                }
                return -1;
            }
        "});
        assert!(e.midpoint);
        assert!(e.bisection_loop);
        assert!(e.midpoint_update);
        assert!(e.early_exit);
        assert!(!e.merge_helper);
    }

    #[test]
    fn test_graph_evidence() {
        let e = evidence(indoc! {"
            from collections import deque
            def bfs(graph, start):
                visited = {start}
                queue = deque([start])
                while queue:
                    node = queue.popleft()
                    for nxt in graph[node]:
                        if nxt not in visited:
                            visited.add(nxt)
                            queue.append(nxt)
        "});
        assert!(e.visited);
        assert!(e.adjacency);
        assert!(e.queue);
        assert!(!e.priority_queue);
    }

    #[test]
    fn test_locate_prefers_name_hints() {
        let e = evidence("def helper():\n    pass\ndef quick_sort(a):\n    pass\n");
        assert_eq!(e.locate(&["quick"]), Some(LineRange::new(3, 4)));
        assert_eq!(e.locate(&["missing"]), Some(LineRange::new(1, 2)));
    }
}
