//! Recursive-shape classification.
//!
//! Used by the structural parser for functions that call themselves and
//! by the catalogue predicates. Call sites are counted textually, so a
//! shadowed name can produce a false positive.

use crate::core::GrowthClass;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecursionKind {
    /// Several calls on a halved input
    DivideAndConquer,
    /// Several calls without shrinking the input geometrically
    BinaryTree,
    /// A single self-call
    Linear,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecursionShape {
    pub kind: RecursionKind,
    pub time: GrowthClass,
    /// Stack depth growth
    pub depth: GrowthClass,
    pub confidence: f64,
    pub sites: usize,
}

/// Classify recursion from the number of self-call sites and the
/// evidence around them.
pub fn classify_recursion(sites: usize, halving: bool, merge_like: bool) -> RecursionShape {
    let (kind, time, depth, confidence) = match sites {
        0 => (
            RecursionKind::None,
            GrowthClass::Unknown,
            GrowthClass::Const,
            0.3,
        ),
        1 => (
            RecursionKind::Linear,
            GrowthClass::Linear,
            GrowthClass::Linear,
            0.8,
        ),
        _ if halving => (
            RecursionKind::DivideAndConquer,
            if merge_like {
                GrowthClass::Linearithmic
            } else {
                GrowthClass::Log
            },
            GrowthClass::Log,
            0.85,
        ),
        _ => (
            RecursionKind::BinaryTree,
            GrowthClass::Exponential,
            GrowthClass::Linear,
            0.75,
        ),
    };

    RecursionShape {
        kind,
        time,
        depth,
        confidence,
        sites,
    }
}

static HALVING_EVIDENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:mid\w*|middle|half\w*|m)\s*=\s*[^;\n]*(?:/\s*2|//\s*2|>>\s*1)|\(\s*[\w.]+\s*(?:/|//|>>)\s*[12]\s*[,)]|len\([^)]*\)\s*//\s*2|\.len\(\)\s*/\s*2|\.length\s*/\s*2|\[\s*:\s*mid\s*\]|\[\s*mid\s*:\s*\]|\[\s*\.\.\s*mid\s*\]|\[\s*mid\s*\.\.\s*\]|\bpivot\b|\bpartition\w*\s*\(",
    )
    .unwrap()
});

static MERGE_STEP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bmerge\w*\s*\(|\bpartition\w*\s*\(|\bcombine\w*\s*\(").unwrap());

/// Evidence that the input shrinks geometrically (midpoints, halved
/// arguments, pivot splits). Expects lower-cased code.
pub fn has_halving_evidence(text: &str) -> bool {
    HALVING_EVIDENCE.is_match(text)
}

/// Evidence of linear combine work per level. Expects lower-cased code.
pub fn has_merge_step(text: &str) -> bool {
    MERGE_STEP.is_match(text)
}

/// Occurrences of `name(` with word boundaries in `code`.
pub fn count_self_calls(code: &str, name: &str) -> usize {
    if name.is_empty() {
        return 0;
    }
    let bytes = code.as_bytes();
    let is_ident = |b: u8| b.is_ascii_alphanumeric() || b == b'_';

    code.match_indices(name)
        .filter(|(at, _)| {
            let before_ok = *at == 0 || !is_ident(bytes[at - 1]);
            let rest = &code[at + name.len()..];
            let after_ok = rest.trim_start().starts_with('(')
                && rest.as_bytes().first().is_none_or(|b| !is_ident(*b));
            before_ok && after_ok
        })
        .count()
}
