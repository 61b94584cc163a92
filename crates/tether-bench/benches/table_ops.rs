//! Criterion micro-benchmarks for weak-keyed table reads, commits and purges.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use tether_bench::{objects, populated_table};
use tether_table::WeakKeyTable;

/// Benchmark: read every value of a 10K-entry table.
fn bench_try_get_value_10k(c: &mut Criterion) {
    let keys = objects(10_000);
    let table = populated_table(&keys);
    c.bench_function("table_try_get_value_10k", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(table.try_get_value(key));
            }
        });
    });
}

/// Benchmark: get_value on 1K absent keys, each creating its value.
fn bench_get_value_miss_1k(c: &mut Criterion) {
    c.bench_function("table_get_value_miss_1k", |b| {
        b.iter_batched(
            || (objects(1_000), WeakKeyTable::new()),
            |(keys, table)| {
                for key in &keys {
                    black_box(table.get_value(key, |k| k[0]));
                }
                (keys, table)
            },
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark: the first read after 1K keys were collected, which purges them.
fn bench_purge_on_read_1k(c: &mut Criterion) {
    let survivor = objects(1);
    c.bench_function("table_purge_on_read_1k", |b| {
        b.iter_batched(
            || {
                let doomed = objects(1_000);
                let table = populated_table(&doomed);
                table.add_or_update(&survivor[0], usize::MAX);
                drop(doomed);
                table
            },
            |table| black_box(table.try_get_value(&survivor[0])),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_try_get_value_10k,
    bench_get_value_miss_1k,
    bench_purge_on_read_1k
);
criterion_main!(benches);
