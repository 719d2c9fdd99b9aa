//! Analysis pipeline benchmarks
//!
//! Synthetic plant readings at growing row counts through the full report,
//! the correlation stage alone and k-means.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tabsight::ml::{KMeans, Point};
use tabsight::stats::correlation_matrix;
use tabsight::{Analyzer, FilterSet, Table, Value};

const TYPES: [&str; 4] = ["Pump", "Valve", "Compressor", "Exchanger"];

/// Create a synthetic equipment table
fn create_plant_table(n_rows: usize) -> Table {
    // Simple LCG random generator for reproducibility
    let mut rng_state: u64 = 42;
    let mut rand_f64 = || -> f64 {
        rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (rng_state >> 33) as f64 / (u32::MAX as f64)
    };

    let rows = (0..n_rows)
        .map(|i| {
            let flow = 50.0 + 100.0 * rand_f64();
            vec![
                Value::from(format!("EQ-{}", i)),
                Value::from(TYPES[i % TYPES.len()]),
                Value::from(flow),
                Value::from(2.0 + flow / 40.0 + rand_f64()),
                Value::from(80.0 + 40.0 * rand_f64()),
            ]
        })
        .collect();
    Table::from_records(&["Equipment", "Type", "Flowrate", "Pressure", "Temperature"], rows)
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("Analyze");
    let analyzer = Analyzer::default();

    for n_rows in [100, 1_000, 10_000] {
        let table = create_plant_table(n_rows);
        group.bench_with_input(BenchmarkId::new("full", n_rows), &table, |b, table| {
            b.iter(|| analyzer.analyze(table, &FilterSet::new()));
        });

        let filters = FilterSet::new()
            .category("Type", ["Pump", "Valve"])
            .range("Flowrate", Some(75.0), None);
        group.bench_with_input(BenchmarkId::new("filtered", n_rows), &table, |b, table| {
            b.iter(|| analyzer.analyze(table, &filters));
        });
    }

    group.finish();
}

fn bench_correlation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Correlation");
    let columns = ["Flowrate", "Pressure", "Temperature"];

    for n_rows in [1_000, 10_000] {
        let table = create_plant_table(n_rows);
        group.bench_with_input(BenchmarkId::new("matrix", n_rows), &table, |b, table| {
            b.iter(|| correlation_matrix(table, &columns[..]));
        });
    }

    group.finish();
}

fn bench_kmeans(c: &mut Criterion) {
    let mut group = c.benchmark_group("KMeans");
    group.sample_size(10);

    for k in [2, 4, 6] {
        let table = create_plant_table(5_000);
        let points: Vec<Point> = (0..table.len())
            .filter_map(|i| {
                let x = table.get(i, "Flowrate").as_f64()?;
                let y = table.get(i, "Pressure").as_f64()?;
                Some(Point::new(x, y))
            })
            .collect();
        let kmeans = KMeans::new(k).with_seed(Some(42));
        group.bench_with_input(BenchmarkId::new("fit", k), &points, |b, points| {
            b.iter(|| kmeans.fit(points));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analyze, bench_correlation, bench_kmeans);
criterion_main!(benches);
