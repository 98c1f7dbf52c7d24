//! Pivot engine benchmarks.
//!
//! Measures aggregation throughput across row counts, key cardinality and
//! calculated fields.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use gridlens::{Aggregation, CalculatedField, PivotConfig, Row, Value, compute_pivot_result};

const REGIONS: &[&str] = &["North", "South", "East", "West", "Central"];

/// Generate synthetic sales rows.
fn generate_rows(rows: usize, products: usize) -> Vec<Row> {
    (0..rows)
        .map(|i| {
            let mut row = Row::new();
            row.insert("region".into(), Value::from(REGIONS[i % REGIONS.len()]));
            row.insert("product".into(), Value::from(format!("P{:04}", i % products)));
            row.insert("quarter".into(), Value::from(format!("Q{}", i % 4 + 1)));
            row.insert("revenue".into(), Value::from((i % 997) as f64 * 1.25));
            row.insert("units".into(), Value::from((i % 13) as i64));
            row
        })
        .collect()
}

fn sales_config() -> PivotConfig {
    PivotConfig::new()
        .row("region")
        .column("quarter")
        .value("revenue", Aggregation::Sum)
        .value("units", Aggregation::Avg)
}

/// Benchmark a two-axis sum/average pivot.
fn bench_pivot_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("pivot_rows");
    let config = sales_config();

    for rows in [1_000, 10_000, 100_000].iter() {
        let data = generate_rows(*rows, 50);
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            b.iter(|| black_box(compute_pivot_result(data, &config)))
        });
    }

    group.finish();
}

/// Benchmark key cardinality: many distinct row keys.
fn bench_pivot_cardinality(c: &mut Criterion) {
    let mut group = c.benchmark_group("pivot_cardinality");
    let config = PivotConfig::new()
        .row("product")
        .row("region")
        .column("quarter")
        .value("revenue", Aggregation::Sum);

    for products in [10, 1_000, 10_000].iter() {
        let data = generate_rows(20_000, *products);
        group.bench_with_input(BenchmarkId::new("products", products), &data, |b, data| {
            b.iter(|| black_box(compute_pivot_result(data, &config)))
        });
    }

    group.finish();
}

/// Benchmark the buffered aggregations and a calculated field.
fn bench_pivot_heavy_aggregations(c: &mut Criterion) {
    let data = generate_rows(10_000, 50);
    let mut group = c.benchmark_group("pivot_heavy_aggregations");

    for aggregation in [Aggregation::Median, Aggregation::CountDistinct, Aggregation::StdDev] {
        let config = PivotConfig::new()
            .row("region")
            .column("quarter")
            .value("revenue", aggregation);
        group.bench_function(aggregation.key(), |b| {
            b.iter(|| black_box(compute_pivot_result(&data, &config)))
        });
    }

    let calculated = sales_config().calculated(CalculatedField::new(
        "per_unit",
        "IF(units_sum > 0, revenue_sum / units_sum, 0)",
    ));
    group.bench_function("calculated", |b| {
        b.iter(|| black_box(compute_pivot_result(&data, &calculated)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_pivot_rows,
    bench_pivot_cardinality,
    bench_pivot_heavy_aggregations,
);
criterion_main!(benches);
