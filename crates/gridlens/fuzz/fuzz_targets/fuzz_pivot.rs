//! Fuzz target for the pivot engine.
//!
//! Arbitrary cells and layouts must never panic, and the grand count always
//! matches the number of aggregated rows.

#![no_main]

use arbitrary::Arbitrary;
use gridlens::{Aggregation, PivotConfig, Row, Value, compute_pivot_result};
use libfuzzer_sys::fuzz_target;

const FIELDS: [&str; 4] = ["a", "b", "c", "d"];

#[derive(Debug, Arbitrary)]
enum Cell {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

#[derive(Debug, Arbitrary)]
struct Input {
    rows: Vec<[Cell; 4]>,
    row_field: u8,
    column_field: u8,
    value_field: u8,
    aggregation: u8,
}

fuzz_target!(|input: Input| {
    if input.rows.len() > 2_000 {
        return;
    }

    let rows: Vec<Row> = input
        .rows
        .into_iter()
        .map(|cells| {
            FIELDS
                .iter()
                .zip(cells)
                .map(|(field, cell)| {
                    let value = match cell {
                        Cell::Null => Value::Null,
                        Cell::Bool(b) => Value::Bool(b),
                        Cell::Number(n) => Value::Number(n),
                        Cell::Text(s) => Value::Text(s),
                    };
                    (field.to_string(), value)
                })
                .collect()
        })
        .collect();

    let pick = |i: u8| FIELDS[i as usize % FIELDS.len()];
    let aggregation = Aggregation::ALL[input.aggregation as usize % Aggregation::ALL.len()];
    let config = PivotConfig::new()
        .row(pick(input.row_field))
        .column(pick(input.column_field))
        .value(pick(input.value_field), aggregation)
        .value(pick(input.value_field), Aggregation::Count);

    if let Some(result) = compute_pivot_result(&rows, &config) {
        assert_eq!(result.grand_total_value(1), Some(rows.len() as f64));
    }
});
