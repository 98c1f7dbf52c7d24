//! Field role classification: dimension, measure or temporal.

use std::collections::{HashMap, HashSet};

use crate::input::{Row, Value, field_value};
use crate::schema::{FieldRole, FieldType};

use super::types::{DistinctKey, TypeAnalyzer};

/// Caller-supplied `field -> role` overrides. An override always wins.
pub type RoleOverrides = HashMap<String, FieldRole>;

/// Tunable constants for the measure-upgrade heuristic.
///
/// Only native numbers are eligible for the upgrade; numeric text always
/// stays a dimension.
#[derive(Debug, Clone)]
pub struct RoleThresholds {
    /// Distinct/non-blank ratio at or above which a numeric field is a measure.
    pub high_cardinality_ratio: f64,
    /// Distinct count above which a numeric field is a measure regardless of ratio.
    pub max_dimension_cardinality: usize,
    /// Fewest distinct points a bounded scale may have.
    pub min_scale_points: usize,
    /// Largest absolute value a bounded scale may contain.
    pub max_scale_magnitude: f64,
    /// Integer columns entirely within this range read as year labels.
    pub year_range: (f64, f64),
}

impl Default for RoleThresholds {
    fn default() -> Self {
        Self {
            high_cardinality_ratio: 0.5,
            max_dimension_cardinality: 20,
            min_scale_points: 2,
            max_scale_magnitude: 1_000_000.0,
            year_range: (1900.0, 2100.0),
        }
    }
}

/// Classifies fields by analytical role.
#[derive(Debug, Clone, Default)]
pub struct RoleDetector {
    thresholds: RoleThresholds,
    types: TypeAnalyzer,
}

impl RoleDetector {
    /// Create a detector with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with custom thresholds.
    pub fn with_thresholds(thresholds: RoleThresholds) -> Self {
        Self {
            thresholds,
            types: TypeAnalyzer::new(),
        }
    }

    pub fn thresholds(&self) -> &RoleThresholds {
        &self.thresholds
    }

    /// Classify `field`, consulting `overrides` first.
    pub fn detect(&self, rows: &[Row], field: &str, overrides: Option<&RoleOverrides>) -> FieldRole {
        if let Some(role) = overrides.and_then(|o| o.get(field)) {
            return *role;
        }

        let values: Vec<&Value> = rows
            .iter()
            .map(|row| field_value(row, field))
            .filter(|v| !v.is_blank())
            .collect();

        if values.is_empty() {
            return FieldRole::Dimension;
        }

        if values.iter().all(|v| v.as_native_number().is_some()) {
            return self.classify_numeric(&values);
        }

        if self.types.detect_column_type(values.iter().copied()) == FieldType::Date {
            return FieldRole::Temporal;
        }

        FieldRole::Dimension
    }

    fn classify_numeric(&self, values: &[&Value]) -> FieldRole {
        let t = &self.thresholds;
        let numbers: Vec<f64> = values.iter().filter_map(|v| v.as_native_number()).collect();
        let distinct: HashSet<DistinctKey> = values.iter().map(|v| DistinctKey::of(v)).collect();
        let unique = distinct.len();
        let ratio = unique as f64 / numbers.len() as f64;

        if ratio >= t.high_cardinality_ratio || unique > t.max_dimension_cardinality {
            return FieldRole::Measure;
        }

        let all_integers = numbers.iter().all(|n| n.fract() == 0.0);
        let looks_like_years = all_integers
            && numbers
                .iter()
                .all(|n| *n >= t.year_range.0 && *n <= t.year_range.1);
        if looks_like_years {
            return FieldRole::Dimension;
        }

        // Low cardinality ratings, sizes and counts are still quantities.
        let bounded = numbers.iter().all(|n| n.abs() <= t.max_scale_magnitude);
        if bounded && unique >= t.min_scale_points {
            return FieldRole::Measure;
        }

        FieldRole::Dimension
    }
}

/// Classify a field with default thresholds.
pub fn detect_field_role(rows: &[Row], field: &str, overrides: Option<&RoleOverrides>) -> FieldRole {
    RoleDetector::new().detect(rows, field, overrides)
}
