//! Benchmarks for compiling and evaluating rules

use ast_rule_engine::rule::{check_rule, clear_cache};
use ast_rule_engine::{combine, compile, evaluate, DataRecord, LogOp, RuleStore};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const SIMPLE_RULE: &str = "age > 18";
const GROUPED_RULE: &str =
    r#"(((age >= 21 AND region="US") OR (vip AND score > 0.75)) AND (plan="pro" OR seats >= 10))"#;

/// Create a realistic data record
fn create_record() -> DataRecord {
    DataRecord::new()
        .with("age", 34)
        .with("region", "US")
        .with("vip", false)
        .with("score", 0.9)
        .with("plan", "team")
        .with("seats", 12)
}

fn benchmark_compile(c: &mut Criterion) {
    c.bench_function("compile_simple", |b| {
        b.iter(|| black_box(compile(black_box(SIMPLE_RULE))))
    });

    c.bench_function("compile_grouped", |b| {
        b.iter(|| black_box(compile(black_box(GROUPED_RULE))))
    });
}

fn benchmark_evaluate(c: &mut Criterion) {
    let data = create_record();
    let ast = compile(GROUPED_RULE).unwrap();

    c.bench_function("evaluate_grouped", |b| {
        b.iter(|| black_box(evaluate(black_box(&ast), black_box(&data))))
    });

    clear_cache();
    c.bench_function("check_rule_cached", |b| {
        b.iter(|| black_box(check_rule(black_box(GROUPED_RULE), black_box(&data))))
    });
}

fn benchmark_combine(c: &mut Criterion) {
    let rules: Vec<String> = (0..20).map(|i| format!("field{} >= {}", i, i * 5)).collect();
    let data: DataRecord = (0..20).map(|i| (format!("field{}", i), i * 6)).collect();

    c.bench_function("combine_20_rules", |b| {
        b.iter(|| black_box(combine(black_box(&rules), LogOp::And)))
    });

    let ast = combine(&rules, LogOp::And).unwrap();
    c.bench_function("evaluate_combined_20_rules", |b| {
        b.iter(|| black_box(evaluate(black_box(&ast), black_box(&data))))
    });
}

fn benchmark_store(c: &mut Criterion) {
    let store = RuleStore::default();
    let ids: Vec<u64> = (0..10)
        .map(|i| store.create(&format!("(field{} > {} OR flag{})", i, i, i)).unwrap())
        .collect();
    let data: DataRecord = (0..10).map(|i| (format!("field{}", i), i)).collect();

    c.bench_function("store_evaluate_combined", |b| {
        b.iter(|| {
            black_box(store.evaluate_combined(black_box(&ids), LogOp::Or, black_box(&data)))
        })
    });
}

criterion_group!(
    benches,
    benchmark_compile,
    benchmark_evaluate,
    benchmark_combine,
    benchmark_store
);
criterion_main!(benches);
