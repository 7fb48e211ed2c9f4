mod common;

use common::*;
use growthmap::core::GrowthClass;
use growthmap::patterns::{detect_all, strongest};

#[test]
fn test_each_fixture_matches_its_catalogue_entry() {
    for (source, expected) in CATALOGUE_FIXTURES {
        let names: Vec<String> = detect_all(source).into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec![expected.to_string()], "fixture for {expected}");
    }
}

#[test]
fn test_naive_fibonacci_matches_nothing() {
    assert!(detect_all(NAIVE_FIB).is_empty());
}

#[test]
fn test_bubble_sort_is_quadratic_with_constant_space() {
    let matches = detect_all(BUBBLE_SORT);
    let bubble = strongest(&matches).unwrap();
    assert_eq!(bubble.name, "Bubble Sort");
    assert_eq!(bubble.time, GrowthClass::Quadratic);
    assert_eq!(bubble.space, GrowthClass::Const);
    assert!(bubble.confidence >= 0.8);
    assert_eq!(bubble.cases.best, GrowthClass::Linear);
}

#[test]
fn test_dynamic_programming_scales_with_table_shape() {
    let lcs = detect_all(LCS);
    assert_eq!(lcs[0].time, GrowthClass::Quadratic);
    assert_eq!(lcs[0].space, GrowthClass::Quadratic);

    let fib = detect_all(FIB_MEMO);
    assert_eq!(fib[0].time, GrowthClass::Linear);
    assert_eq!(fib[0].space, GrowthClass::Linear);
}

#[test]
fn test_matches_carry_evidence_tags_and_location() {
    for m in detect_all(MERGE_SORT) {
        assert!(m.evidence.contains(&"merge-helper".to_string()));
        assert_eq!(m.lines.map(|l| l.start), Some(1));
    }
}

#[test]
fn test_detection_is_deterministic() {
    for (source, _) in CATALOGUE_FIXTURES {
        assert_eq!(detect_all(source), detect_all(source));
    }
}
