//! Evaluate benchmarks — the hot path.
//!
//! Measures: safe vs fast evaluation, field descent, array records,
//! miss-heavy workloads, and trace overhead.

use mongory::prelude::*;
use serde_json::json;

fn main() {
    divan::main();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Fixtures
// ═══════════════════════════════════════════════════════════════════════════════

fn query(condition: serde_json::Value) -> QueryMatcher {
    Engine::default().compile(condition).unwrap()
}

fn person(age: i64, status: &str, name: &str) -> Value {
    Value::from(json!({"age": age, "status": status, "name": name, "tags": ["a", "b", "c"]}))
}

fn scenario() -> QueryMatcher {
    query(json!({
        "age": {"$gte": 18},
        "$or": [{"status": "active"}, {"name": {"$regex": "^J"}}]
    }))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Safe vs fast
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn scenario_safe_hit(bencher: divan::Bencher) {
    let matcher = scenario();
    let record = person(25, "inactive", "Jane");
    bencher.bench_local(|| matcher.is_match(&record));
}

#[divan::bench]
fn scenario_fast_hit(bencher: divan::Bencher) {
    let matcher = scenario();
    matcher.set_need_convert(false);
    let fast = matcher.to_proc();
    let record = person(25, "inactive", "Jane");
    bencher.bench_local(|| fast.call(&record));
}

#[divan::bench]
fn scenario_safe_miss(bencher: divan::Bencher) {
    let matcher = scenario();
    let record = person(16, "active", "Jane");
    bencher.bench_local(|| matcher.is_match(&record));
}

#[divan::bench]
fn scenario_fast_miss(bencher: divan::Bencher) {
    let matcher = scenario();
    matcher.set_need_convert(false);
    let fast = matcher.to_proc();
    let record = person(16, "active", "Jane");
    bencher.bench_local(|| fast.call(&record));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Shapes
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn dotted_path(bencher: divan::Bencher) {
    let matcher = query(json!({"a.b.c.d": 1}));
    let fast = matcher.to_proc();
    let record = Value::from(json!({"a": {"b": {"c": {"d": 1}}}}));
    bencher.bench_local(|| fast.call(&record));
}

#[divan::bench]
fn array_record_any_element(bencher: divan::Bencher) {
    let matcher = query(json!({"tags": "c"}));
    let fast = matcher.to_proc();
    let record = person(30, "active", "Ann");
    bencher.bench_local(|| fast.call(&record));
}

#[divan::bench]
fn in_membership(bencher: divan::Bencher) {
    let matcher = query(json!({"status": {"$in": ["pending", "active", "archived"]}}));
    let fast = matcher.to_proc();
    let record = person(30, "archived", "Ann");
    bencher.bench_local(|| fast.call(&record));
}

#[divan::bench(args = [1, 10, 100, 1000])]
fn elem_match_scaling(bencher: divan::Bencher, n: usize) {
    let matcher = query(json!({"items": {"$elemMatch": {"sku": "last"}}}));
    let fast = matcher.to_proc();
    let mut items: Vec<serde_json::Value> = (0..n.saturating_sub(1))
        .map(|i| json!({"sku": format!("sku_{i}")}))
        .collect();
    items.push(json!({"sku": "last"}));
    let record = Value::from(json!({"items": items}));
    bencher.bench_local(|| fast.call(&record));
}

#[divan::bench(args = [1, 10, 50, 100])]
fn or_branches_miss(bencher: divan::Bencher, n: usize) {
    let branches: Vec<serde_json::Value> = (0..n).map(|i| json!({"status": format!("s{i}")})).collect();
    let matcher = query(json!({"$or": branches}));
    let fast = matcher.to_proc();
    let record = person(30, "none", "Ann");
    bencher.bench_local(|| fast.call(&record));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Trace overhead
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn scenario_traced(bencher: divan::Bencher) {
    let matcher = scenario();
    let record = person(25, "inactive", "Jane");
    bencher.bench_local(|| matcher.trace(&record));
}
