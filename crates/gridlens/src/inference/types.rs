//! Column type detection and per-field statistics.

use std::collections::HashSet;

use indexmap::IndexSet;

use crate::input::{Row, Value, field_value};
use crate::schema::{ColumnValues, FieldStats, FieldType};

/// Default cap on distinct values returned for display.
pub const DEFAULT_MAX_UNIQUE_VALUES: usize = 1000;

/// Type detection settings.
#[derive(Debug, Clone)]
pub struct TypeDetectionConfig {
    /// Fraction of non-blank values that must match a type for it to win.
    pub match_threshold: f64,
}

impl Default for TypeDetectionConfig {
    fn default() -> Self {
        Self { match_threshold: 0.8 }
    }
}

/// Detects column types and computes column statistics.
#[derive(Debug, Clone, Default)]
pub struct TypeAnalyzer {
    config: TypeDetectionConfig,
}

#[derive(Debug, Default)]
struct TypeTally {
    total: usize,
    numeric: usize,
    boolean: usize,
    date: usize,
}

impl TypeAnalyzer {
    /// Create a new analyzer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with custom settings.
    pub fn with_config(config: TypeDetectionConfig) -> Self {
        Self { config }
    }

    /// Infer the semantic type of a column from its values.
    ///
    /// Blank values are ignored. Numeric is checked first, then boolean, then
    /// date; a type wins when at least `match_threshold` of the non-blank
    /// values match it. Empty columns are `String`.
    pub fn detect_column_type<'a>(&self, values: impl IntoIterator<Item = &'a Value>) -> FieldType {
        let mut tally = TypeTally::default();
        for value in values {
            if value.is_blank() {
                continue;
            }
            tally.total += 1;
            if value.as_f64().is_some() {
                tally.numeric += 1;
            }
            if value.as_bool().is_some() {
                tally.boolean += 1;
            }
            if value.as_date().is_some() {
                tally.date += 1;
            }
        }

        if tally.total == 0 {
            return FieldType::String;
        }

        let passes = |count: usize| {
            count as f64 / tally.total as f64 >= self.config.match_threshold - f64::EPSILON
        };

        if passes(tally.numeric) {
            FieldType::Number
        } else if passes(tally.boolean) {
            FieldType::Boolean
        } else if passes(tally.date) {
            FieldType::Date
        } else {
            FieldType::String
        }
    }

    /// Detect a field's type and compute its statistics.
    pub fn detect_field_type(&self, rows: &[Row], field: &str) -> FieldStats {
        if rows.is_empty() {
            return FieldStats::empty(field);
        }

        let values: Vec<&Value> = rows.iter().map(|row| field_value(row, field)).collect();
        let field_type = self.detect_column_type(values.iter().copied());

        let mut distinct: HashSet<DistinctKey> = HashSet::new();
        let mut null_count = 0;
        for value in &values {
            if value.is_blank() {
                null_count += 1;
            } else {
                distinct.insert(DistinctKey::of(value));
            }
        }

        let mut stats = FieldStats {
            field: field.to_string(),
            field_type,
            is_numeric: field_type.is_numeric(),
            unique_count: distinct.len(),
            null_count,
            row_count: values.len(),
            numeric_min: None,
            numeric_max: None,
            date_min: None,
            date_max: None,
        };
        fill_ranges(
            field_type,
            values.iter().copied(),
            &mut stats.numeric_min,
            &mut stats.numeric_max,
            &mut stats.date_min,
            &mut stats.date_max,
        );
        stats
    }

    /// Distinct values of a field, capped at `max_values`.
    ///
    /// Values keep first-seen order so truncation is deterministic.
    pub fn column_unique_values(
        &self,
        rows: &[Row],
        field: &str,
        max_values: Option<usize>,
    ) -> ColumnValues {
        let cap = max_values.unwrap_or(DEFAULT_MAX_UNIQUE_VALUES);
        let values: Vec<&Value> = rows.iter().map(|row| field_value(row, field)).collect();
        let field_type = self.detect_column_type(values.iter().copied());

        let mut seen: IndexSet<DistinctKey> = IndexSet::new();
        let mut kept = Vec::new();
        let mut null_count = 0;
        for value in &values {
            if value.is_blank() {
                null_count += 1;
                continue;
            }
            if seen.insert(DistinctKey::of(value)) && kept.len() < cap {
                kept.push((*value).clone());
            }
        }

        let mut result = ColumnValues {
            field: field.to_string(),
            truncated: seen.len() > kept.len(),
            unique_count: seen.len(),
            values: kept,
            total_count: values.len(),
            null_count,
            numeric_min: None,
            numeric_max: None,
            date_min: None,
            date_max: None,
        };
        fill_ranges(
            field_type,
            values.iter().copied(),
            &mut result.numeric_min,
            &mut result.numeric_max,
            &mut result.date_min,
            &mut result.date_max,
        );
        result
    }
}

/// Identity of a value for distinct counting: kind plus rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct DistinctKey(u8, String);

impl DistinctKey {
    pub(crate) fn of(value: &Value) -> Self {
        DistinctKey(value.kind_tag(), value.to_string())
    }
}

fn fill_ranges<'a>(
    field_type: FieldType,
    values: impl Iterator<Item = &'a Value>,
    numeric_min: &mut Option<f64>,
    numeric_max: &mut Option<f64>,
    date_min: &mut Option<chrono::NaiveDateTime>,
    date_max: &mut Option<chrono::NaiveDateTime>,
) {
    match field_type {
        FieldType::Number => {
            for n in values.filter_map(Value::as_f64) {
                *numeric_min = Some(numeric_min.map_or(n, |m| m.min(n)));
                *numeric_max = Some(numeric_max.map_or(n, |m| m.max(n)));
            }
        }
        FieldType::Date => {
            for d in values.filter_map(Value::as_date) {
                *date_min = Some(date_min.map_or(d, |m| m.min(d)));
                *date_max = Some(date_max.map_or(d, |m| m.max(d)));
            }
        }
        FieldType::String | FieldType::Boolean => {}
    }
}

/// Infer a column's type with default settings.
pub fn detect_column_type<'a>(values: impl IntoIterator<Item = &'a Value>) -> FieldType {
    TypeAnalyzer::new().detect_column_type(values)
}

/// Compute a field's statistics with default settings.
pub fn detect_field_type(rows: &[Row], field: &str) -> FieldStats {
    TypeAnalyzer::new().detect_field_type(rows, field)
}

/// Distinct values of a field with default settings.
pub fn get_column_unique_values(rows: &[Row], field: &str, max_values: Option<usize>) -> ColumnValues {
    TypeAnalyzer::new().column_unique_values(rows, field, max_values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::row_from_pairs;

    fn texts(values: &[&str]) -> Vec<Value> {
        values.iter().map(|v| Value::from(*v)).collect()
    }

    fn column(field: &str, values: Vec<Value>) -> Vec<Row> {
        values
            .into_iter()
            .map(|v| row_from_pairs([(field, v)]))
            .collect()
    }

    #[test]
    fn test_numeric_threshold_boundary() {
        let eight = texts(&["1", "2", "3", "4", "5", "6", "7", "8", "a", "b"]);
        assert_eq!(detect_column_type(&eight), FieldType::Number);

        let seven = texts(&["1", "2", "3", "4", "5", "6", "7", "a", "b", "c"]);
        assert_eq!(detect_column_type(&seven), FieldType::String);
    }

    #[test]
    fn test_boolean_and_date_detection() {
        assert_eq!(detect_column_type(&texts(&["true", "FALSE", "true"])), FieldType::Boolean);
        assert_eq!(detect_column_type(&[Value::Bool(true), Value::Bool(false)]), FieldType::Boolean);
        assert_eq!(
            detect_column_type(&texts(&["2024-01-01", "2024-02-01", "2024-03-01"])),
            FieldType::Date
        );
    }

    #[test]
    fn test_numeric_wins_over_date_when_both_match() {
        // Numeric is checked first.
        let values = vec![Value::from(1.0), Value::from(2.0), Value::from(3.0)];
        assert_eq!(detect_column_type(&values), FieldType::Number);
    }

    #[test]
    fn test_blanks_ignored_and_empty_defaults_to_string() {
        let empty: Vec<Value> = Vec::new();
        assert_eq!(detect_column_type(&empty), FieldType::String);
        assert_eq!(detect_column_type(&[Value::Null, Value::from("")]), FieldType::String);
        let mixed = vec![Value::Null, Value::from(4.0), Value::Null, Value::from(5.0)];
        assert_eq!(detect_column_type(&mixed), FieldType::Number);
    }

    #[test]
    fn test_field_stats() {
        let rows = column(
            "amount",
            vec![Value::from(10.0), Value::from(-2.5), Value::Null, Value::from(10.0)],
        );
        let stats = detect_field_type(&rows, "amount");

        assert_eq!(stats.field_type, FieldType::Number);
        assert!(stats.is_numeric);
        assert_eq!(stats.unique_count, 2);
        assert_eq!(stats.null_count, 1);
        assert_eq!(stats.row_count, 4);
        assert_eq!(stats.numeric_min, Some(-2.5));
        assert_eq!(stats.numeric_max, Some(10.0));
        assert!(stats.date_min.is_none());
    }

    #[test]
    fn test_date_stats() {
        let rows = column("day", texts(&["2024-03-01", "2024-01-15", "2024-02-10"]));
        let stats = detect_field_type(&rows, "day");
        assert_eq!(stats.field_type, FieldType::Date);
        assert_eq!(stats.date_min.unwrap().to_string(), "2024-01-15 00:00:00");
        assert_eq!(stats.date_max.unwrap().to_string(), "2024-03-01 00:00:00");
    }

    #[test]
    fn test_missing_field_is_all_null() {
        let rows = column("a", texts(&["x", "y"]));
        let stats = detect_field_type(&rows, "missing");
        assert_eq!(stats.field_type, FieldType::String);
        assert_eq!(stats.unique_count, 0);
        assert_eq!(stats.null_count, 2);
    }

    #[test]
    fn test_empty_rows_never_panic() {
        let stats = detect_field_type(&[], "anything");
        assert_eq!(stats.field_type, FieldType::String);
        assert_eq!(stats.unique_count, 0);
    }

    #[test]
    fn test_unique_values_truncate_in_insertion_order() {
        let rows = column("c", texts(&["b", "a", "b", "c", "", "d"]));
        let result = get_column_unique_values(&rows, "c", Some(2));

        assert_eq!(result.values, texts(&["b", "a"]));
        assert!(result.truncated);
        assert_eq!(result.unique_count, 4);
        assert_eq!(result.total_count, 6);
        assert_eq!(result.null_count, 1);
    }

    #[test]
    fn test_unique_values_numeric_range() {
        let rows = column("n", vec![Value::from(3.0), Value::from(9.0), Value::from(3.0)]);
        let result = get_column_unique_values(&rows, "n", None);
        assert_eq!(result.values.len(), 2);
        assert!(!result.truncated);
        assert_eq!(result.numeric_min, Some(3.0));
        assert_eq!(result.numeric_max, Some(9.0));
    }

    #[test]
    fn test_native_and_text_numbers_are_distinct() {
        let rows = column("v", vec![Value::from(1.0), Value::from("1")]);
        assert_eq!(detect_field_type(&rows, "v").unique_count, 2);
    }
}
