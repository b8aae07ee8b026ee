//! Benchmarks for building statistics tables.
//!
//! ```bash
//! cargo bench --features test-utils --bench stats_table_bench
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use showstats::presenter::{MarkdownFormatter, TableFormatter};
use showstats::test_fixtures::sample_dataset;
use showstats::StatsReport;
use std::hint::black_box;
use std::time::Duration;
use tokio::runtime::Runtime;

fn bench_summary_table(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("summary_table");
    group.measurement_time(Duration::from_secs(10));

    for rows in [1_000usize, 100_000] {
        let dataset = sample_dataset(rows).unwrap();
        let report = StatsReport::summary();
        group.bench_with_input(BenchmarkId::from_parameter(rows), &dataset, |b, dataset| {
            b.iter(|| rt.block_on(async { black_box(report.make_table(dataset).await.unwrap()) }))
        });
    }
    group.finish();
}

fn bench_categorical_table(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let dataset = sample_dataset(100_000).unwrap();
    let report = StatsReport::categorical();

    c.bench_function("categorical_table_100k", |b| {
        b.iter(|| rt.block_on(async { black_box(report.make_table(&dataset).await.unwrap()) }))
    });
}

fn bench_render(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let table = rt
        .block_on(StatsReport::summary().make_table(sample_dataset(1_000).unwrap()))
        .unwrap();
    let formatter = MarkdownFormatter::default();

    c.bench_function("render_markdown", |b| {
        b.iter(|| black_box(formatter.format(&table).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_summary_table,
    bench_categorical_table,
    bench_render
);
criterion_main!(benches);
