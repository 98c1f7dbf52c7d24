//! Chart-oriented field analysis and axis suggestion.

use serde::{Deserialize, Serialize};

use crate::input::{Row, field_names};
use crate::schema::{FieldRole, FieldStats};

use super::role::{RoleDetector, RoleOverrides};
use super::types::TypeAnalyzer;

/// Role and statistics of one field, for chart axis binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAnalysis {
    pub field: String,
    pub role: FieldRole,
    pub stats: FieldStats,
}

/// Suggested axis bindings for a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSuggestion {
    /// Category or time axis.
    pub x: String,
    /// One or more measures.
    pub y: Vec<String>,
}

/// Runs role detection over every field of a row set.
#[derive(Debug, Clone, Default)]
pub struct ChartFieldAnalyzer {
    roles: RoleDetector,
    types: TypeAnalyzer,
}

impl ChartFieldAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detector(roles: RoleDetector) -> Self {
        Self {
            roles,
            types: TypeAnalyzer::new(),
        }
    }

    /// Use `types` for the per-field stats as well.
    pub fn with_analyzers(roles: RoleDetector, types: TypeAnalyzer) -> Self {
        Self { roles, types }
    }

    /// Analyze every field present in the first row, in column order.
    ///
    /// See [`rank_chart_fields`] for the fields ordered as axis candidates.
    pub fn analyze(&self, rows: &[Row], overrides: Option<&RoleOverrides>) -> Vec<FieldAnalysis> {
        field_names(rows)
            .into_iter()
            .map(|field| {
                let role = self.roles.detect(rows, &field, overrides);
                let stats = self.types.detect_field_type(rows, &field);
                FieldAnalysis { field, role, stats }
            })
            .collect()
    }
}

/// Analyze all fields with default settings.
pub fn analyze_fields_for_chart(rows: &[Row], overrides: Option<&RoleOverrides>) -> Vec<FieldAnalysis> {
    ChartFieldAnalyzer::new().analyze(rows, overrides)
}

/// Chart-eligible fields, best axis candidates first.
///
/// Temporal fields come first, then measures, then dimensions by ascending
/// cardinality. Dimensions with fewer than two distinct values are left out.
/// Ties keep column order.
pub fn rank_chart_fields(fields: &[FieldAnalysis]) -> Vec<&FieldAnalysis> {
    let mut ranked: Vec<&FieldAnalysis> = fields
        .iter()
        .filter(|f| f.role != FieldRole::Dimension || f.stats.unique_count >= 2)
        .collect();
    ranked.sort_by_key(|f| match f.role {
        FieldRole::Temporal => (0, 0),
        FieldRole::Measure => (1, 0),
        FieldRole::Dimension => (2, f.stats.unique_count),
    });
    ranked
}

/// Pick an x-axis and y-axes from analyzed fields.
///
/// The x-axis is the first temporal field, otherwise the lowest-cardinality
/// dimension with at least two values. Every measure other than the x field
/// goes on the y-axis. Returns `None` without a usable x field or measure.
pub fn suggest_chart_axes(fields: &[FieldAnalysis]) -> Option<AxisSuggestion> {
    let x = fields
        .iter()
        .find(|f| f.role == FieldRole::Temporal)
        .or_else(|| {
            fields
                .iter()
                .filter(|f| f.role == FieldRole::Dimension && f.stats.unique_count >= 2)
                .min_by_key(|f| f.stats.unique_count)
        })?;

    let y: Vec<String> = fields
        .iter()
        .filter(|f| f.role == FieldRole::Measure && f.field != x.field)
        .map(|f| f.field.clone())
        .collect();

    if y.is_empty() {
        return None;
    }

    Some(AxisSuggestion {
        x: x.field.clone(),
        y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Value, row_from_pairs};

    fn sales_rows() -> Vec<Row> {
        let regions = ["East", "West", "North"];
        (0..12)
            .map(|i| {
                row_from_pairs([
                    ("region", Value::from(regions[i % 3])),
                    ("product", Value::from(format!("P{}", i % 6))),
                    ("revenue", Value::from(100.0 + i as f64 * 7.5)),
                ])
            })
            .collect()
    }

    #[test]
    fn test_analyze_keeps_column_order() {
        let analysis = analyze_fields_for_chart(&sales_rows(), None);
        let names: Vec<&str> = analysis.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["region", "product", "revenue"]);
        assert_eq!(analysis[0].role, FieldRole::Dimension);
        assert_eq!(analysis[2].role, FieldRole::Measure);
        assert_eq!(analysis[0].stats.unique_count, 3);
    }

    #[test]
    fn test_empty_rows_give_empty_analysis() {
        assert!(analyze_fields_for_chart(&[], None).is_empty());
    }

    #[test]
    fn test_overrides_flow_through() {
        let mut overrides = RoleOverrides::new();
        overrides.insert("revenue".to_string(), FieldRole::Dimension);
        let analysis = analyze_fields_for_chart(&sales_rows(), Some(&overrides));
        assert_eq!(analysis[2].role, FieldRole::Dimension);
    }

    #[test]
    fn test_suggest_prefers_low_cardinality_dimension() {
        let analysis = analyze_fields_for_chart(&sales_rows(), None);
        let axes = suggest_chart_axes(&analysis).unwrap();
        assert_eq!(axes.x, "region");
        assert_eq!(axes.y, vec!["revenue".to_string()]);
    }

    #[test]
    fn test_suggest_prefers_temporal() {
        let rows: Vec<Row> = (1..=5)
            .map(|d| {
                row_from_pairs([
                    ("region", Value::from(if d % 2 == 0 { "A" } else { "B" })),
                    ("day", Value::from(format!("2024-01-0{}", d))),
                    ("units", Value::from(d as f64 * 3.0)),
                ])
            })
            .collect();
        let axes = suggest_chart_axes(&analyze_fields_for_chart(&rows, None)).unwrap();
        assert_eq!(axes.x, "day");
    }

    #[test]
    fn test_rank_chart_fields() {
        let rows: Vec<Row> = (1..=5)
            .map(|d| {
                row_from_pairs([
                    ("site", Value::from("HQ")),
                    ("product", Value::from(format!("P{}", d % 3))),
                    ("region", Value::from(if d % 2 == 0 { "A" } else { "B" })),
                    ("units", Value::from(d as f64 * 3.0)),
                    ("day", Value::from(format!("2024-01-0{}", d))),
                ])
            })
            .collect();
        let analysis = analyze_fields_for_chart(&rows, None);
        let ranked: Vec<&str> = rank_chart_fields(&analysis)
            .into_iter()
            .map(|f| f.field.as_str())
            .collect();
        assert_eq!(ranked, vec!["day", "units", "region", "product"]);
    }

    #[test]
    fn test_suggest_none_without_measures() {
        let rows = vec![
            row_from_pairs([("a", "x")]),
            row_from_pairs([("a", "y")]),
        ];
        assert!(suggest_chart_axes(&analyze_fields_for_chart(&rows, None)).is_none());
    }
}
