//! Algorithm pattern matching.
//!
//! Recognises well-known algorithms from a once-normalized line stream and
//! the structural tree. Entries are independent; each one either matches
//! in full or not at all.

pub mod catalogue;
pub mod evidence;
pub mod recursion;

pub use catalogue::{case_split_for, CatalogueEntry, CATALOGUE};
pub use evidence::Evidence;
pub use recursion::{classify_recursion, RecursionKind, RecursionShape};

use crate::core::{AlgorithmMatch, SyntaxNode};
use crate::parser::normalize::NormalizedSource;
use crate::parser::StructuralParser;

#[derive(Debug, Clone, Copy, Default)]
pub struct PatternMatcher;

impl PatternMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Matches in catalogue order.
    pub fn detect(&self, source: &NormalizedSource, root: &SyntaxNode) -> Vec<AlgorithmMatch> {
        let evidence = Evidence::collect(source, root);
        let matches: Vec<AlgorithmMatch> = CATALOGUE
            .iter()
            .filter_map(|entry| entry.evaluate(&evidence))
            .collect();

        tracing::debug!(
            matched = matches.len(),
            names = ?matches.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
            "pattern matching complete"
        );
        matches
    }
}

/// Normalize, parse and match raw text.
pub fn detect_all(text: &str) -> Vec<AlgorithmMatch> {
    let source = NormalizedSource::new(text);
    let parsed = StructuralParser::default().parse(&source);
    PatternMatcher::new().detect(&source, &parsed.root)
}

/// Highest-confidence match; earlier catalogue entries win ties.
pub fn strongest(matches: &[AlgorithmMatch]) -> Option<&AlgorithmMatch> {
    matches.iter().reduce(|best, m| {
        if m.confidence > best.confidence {
            m
        } else {
            best
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GrowthClass;

    #[test]
    fn test_plain_code_matches_nothing() {
        assert!(detect_all("x = 1\ny = x + 2\nprint(y)\n").is_empty());
        assert!(detect_all("").is_empty());
    }

    #[test]
    fn test_strongest_prefers_confidence_then_order() {
        let m = |name: &str, confidence: f64| AlgorithmMatch {
            name: name.to_string(),
            time: GrowthClass::Linear,
            space: GrowthClass::Const,
            cases: crate::core::CaseSplit::uniform(GrowthClass::Linear),
            confidence,
            evidence: Vec::new(),
            lines: None,
        };
        let matches = vec![m("a", 0.8), m("b", 0.9), m("c", 0.9)];
        assert_eq!(strongest(&matches).map(|m| m.name.as_str()), Some("b"));
        assert!(strongest(&[]).is_none());
    }
}
