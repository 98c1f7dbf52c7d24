//! Type, role and parsing benchmarks.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use gridlens::inference::StatsCache;
use gridlens::{GridLens, Parser, Row, analyze_fields_for_chart, detect_field_type, rows_from_json};

/// Generate synthetic CSV data with mixed column types.
fn generate_csv_data(rows: usize) -> String {
    let mut data = String::from("id,amount,day,active,category,rating\n");
    for row in 0..rows {
        data.push_str(&format!(
            "ID_{:06},{:.2},2023-{:02}-{:02},{},Category_{},{}\n",
            row,
            row as f64 * 1.5,
            (row % 12) + 1,
            (row % 28) + 1,
            row % 2 == 0,
            row % 10,
            row % 5 + 1,
        ));
    }
    data
}

fn generate_rows(rows: usize) -> Vec<Row> {
    Parser::new()
        .parse_str(&generate_csv_data(rows))
        .map(|(rows, _)| rows)
        .unwrap_or_default()
}

/// Benchmark delimited parsing with auto-detection.
fn bench_parse_csv(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_csv");

    for rows in [100, 1_000, 10_000].iter() {
        let data = generate_csv_data(*rows);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            b.iter(|| black_box(Parser::new().parse_str(data).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark JSON row loading.
fn bench_parse_json(c: &mut Criterion) {
    let rows = generate_rows(5_000);
    let json = serde_json::to_string(&rows).unwrap();
    c.bench_function("parse_json_5000", |b| {
        b.iter(|| black_box(rows_from_json(&json).unwrap()))
    });
}

/// Benchmark single-field type detection and stats.
fn bench_field_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_stats");

    for rows in [1_000, 10_000, 100_000].iter() {
        let data = generate_rows(*rows);
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            b.iter(|| black_box(detect_field_type(data, "amount")))
        });
    }

    group.finish();
}

/// Benchmark cached stats lookups against recomputation.
fn bench_stats_cache(c: &mut Criterion) {
    let data = generate_rows(10_000);
    let mut cache = StatsCache::new();
    cache.reset_for(&data);
    cache.field_stats(&data, "day");
    c.bench_function("stats_cache_hit", |b| {
        b.iter(|| black_box(cache.field_stats(&data, "day").unique_count))
    });
    c.bench_function("stats_recompute", |b| {
        b.iter(|| black_box(detect_field_type(&data, "day").unique_count))
    });
}

/// Benchmark chart analysis across every field.
fn bench_chart_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("chart_analysis");

    for rows in [1_000, 10_000].iter() {
        let data = generate_rows(*rows);
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            b.iter(|| black_box(analyze_fields_for_chart(data, None)))
        });
    }

    let lens = GridLens::new(generate_rows(10_000));
    group.bench_function("suggest_axes", |b| b.iter(|| black_box(lens.suggest_axes())));

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_csv,
    bench_parse_json,
    bench_field_stats,
    bench_stats_cache,
    bench_chart_analysis,
);
criterion_main!(benches);
