//! Per-field statistics.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::types::FieldType;
use crate::input::Value;

/// Derived descriptor for one field of a row set.
///
/// Recomputed whenever the rows or field set change; never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldStats {
    /// Field name.
    pub field: String,
    /// Detected type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the detected type is numeric.
    pub is_numeric: bool,
    /// Number of distinct non-blank values.
    pub unique_count: usize,
    /// Number of blank values.
    pub null_count: usize,
    /// Number of rows inspected.
    pub row_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_min: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_max: Option<NaiveDateTime>,
}

impl FieldStats {
    /// Stats for a field with no usable values.
    pub fn empty(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            field_type: FieldType::String,
            is_numeric: false,
            unique_count: 0,
            null_count: 0,
            row_count: 0,
            numeric_min: None,
            numeric_max: None,
            date_min: None,
            date_max: None,
        }
    }

    /// Fraction of non-blank values that are distinct.
    pub fn cardinality_ratio(&self) -> f64 {
        let non_null = self.row_count.saturating_sub(self.null_count);
        if non_null == 0 {
            0.0
        } else {
            self.unique_count as f64 / non_null as f64
        }
    }

    /// Get the null percentage.
    pub fn null_percentage(&self) -> f64 {
        if self.row_count == 0 {
            0.0
        } else {
            (self.null_count as f64 / self.row_count as f64) * 100.0
        }
    }
}

/// Distinct values of a column for filter lists and value pickers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnValues {
    pub field: String,
    /// Distinct non-blank values in first-seen order, capped.
    pub values: Vec<Value>,
    /// Distinct non-blank values before capping.
    pub unique_count: usize,
    /// Whether `values` was cut at the cap.
    pub truncated: bool,
    /// Rows inspected.
    pub total_count: usize,
    /// Blank values seen.
    pub null_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_min: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_max: Option<NaiveDateTime>,
}
