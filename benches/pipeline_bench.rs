use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use growthmap::core::{CostSample, GrowthClass};
use growthmap::parser::parse_source;
use growthmap::patterns::detect_all;
use growthmap::regression::RegressionEngine;
use growthmap::sampling::DEFAULT_SIZES;
use growthmap::{analyze, AnalysisOptions};
use std::hint::black_box;

const QUICK_SORT: &str = r#"def quick_sort(arr):
    if len(arr) <= 1:
        return arr
    pivot = arr[len(arr) // 2]
    left = [x for x in arr if x < pivot]
    middle = [x for x in arr if x == pivot]
    right = [x for x in arr if x > pivot]
    return quick_sort(left) + middle + quick_sort(right)
"#;

/// A source file with `count` copies of a doubly nested C function.
fn generated_source(count: usize) -> String {
    (0..count)
        .map(|i| {
            format!(
                "int f{i}(int* a, int n) {{\n  int s = 0;\n  for (int i = 0; i < n; i++) {{\n    for (int j = 0; j < n; j++) {{\n      if (a[i] > a[j]) s++;\n    }}\n  }}\n  return s;\n}}\n"
            )
        })
        .collect()
}

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for count in [1, 10, 100] {
        let source = generated_source(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &source, |b, src| {
            b.iter(|| parse_source(black_box(src)))
        });
    }
    group.finish();
}

fn bench_pattern_matching(c: &mut Criterion) {
    c.bench_function("detect_all/quick_sort", |b| {
        b.iter(|| detect_all(black_box(QUICK_SORT)))
    });
}

fn bench_regression(c: &mut Criterion) {
    let samples: Vec<CostSample> = DEFAULT_SIZES
        .iter()
        .map(|&size| CostSample {
            size,
            cost: 1.7 * GrowthClass::Linearithmic.evaluate(size as f64),
            iterations: 1,
            memory_estimate: 1.0,
        })
        .collect();
    let engine = RegressionEngine::new();
    c.bench_function("regression/fit", |b| {
        b.iter(|| engine.fit(black_box(&samples)))
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    let structural = AnalysisOptions::default().without_sampling();
    let sampled = AnalysisOptions::default().with_seed(1);
    c.bench_function("analyze/structural", |b| {
        b.iter(|| analyze(black_box(QUICK_SORT), &structural))
    });
    c.bench_function("analyze/sampled", |b| {
        b.iter(|| analyze(black_box(QUICK_SORT), &sampled))
    });
}

criterion_group!(
    benches,
    bench_parser,
    bench_pattern_matching,
    bench_regression,
    bench_full_pipeline
);
criterion_main!(benches);
