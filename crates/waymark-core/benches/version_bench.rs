//! # Version Benchmarks
//!
//! Performance benchmarks for version comparison and gate checks.
//!
//! Run with: `cargo bench -p waymark-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tempfile::tempdir;
use waymark_core::version::compare;
use waymark_core::{MemoryStore, MigrationGate, RedbStore, StaticIdentity};

/// Build a dotted version with `parts` components, e.g. `"1.2.3.4"`.
fn dotted(parts: usize, last: usize) -> String {
    let mut components: Vec<String> = (1..parts).map(|i| i.to_string()).collect();
    components.push(last.to_string());
    components.join(".")
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");

    for parts in [2, 4, 16].iter() {
        let a = dotted(*parts, 9);
        let b = dotted(*parts, 10);
        group.bench_with_input(BenchmarkId::from_parameter(parts), parts, |bench, _| {
            bench.iter(|| black_box(compare(black_box(&a), black_box(&b))));
        });
    }

    group.bench_function("long_digit_run", |bench| {
        let a = "9".repeat(256);
        let b = format!("1{}", "0".repeat(256));
        bench.iter(|| black_box(compare(black_box(&a), black_box(&b))));
    });

    group.finish();
}

fn bench_gate_skip(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate_skip");

    group.bench_function("memory", |bench| {
        let gate = MigrationGate::new(MemoryStore::new(), StaticIdentity::new("5.0", "1"));
        let _ = gate.migrate_to_version("5.0", || {});
        bench.iter(|| black_box(gate.migrate_to_version(black_box("4.9"), || {})));
    });

    group.bench_function("redb", |bench| {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("bench.redb")).expect("open");
        let gate = MigrationGate::new(store, StaticIdentity::new("5.0", "1"));
        let _ = gate.migrate_to_version("5.0", || {});
        bench.iter(|| black_box(gate.migrate_to_version(black_box("4.9"), || {})));
    });

    group.finish();
}

fn bench_redb_commit(c: &mut Criterion) {
    c.bench_function("redb_marker_commit", |bench| {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("bench.redb")).expect("open");
        let gate = MigrationGate::new(store, StaticIdentity::new("1.0", "1"));
        bench.iter(|| {
            let _ = gate.reset();
            black_box(gate.migrate_to_version("1.0", || {}))
        });
    });
}

criterion_group!(benches, bench_compare, bench_gate_skip, bench_redb_commit);

criterion_main!(benches);
