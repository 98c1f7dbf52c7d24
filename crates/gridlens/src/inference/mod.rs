//! Type, statistics and role inference for fields.

mod cache;
mod chart;
mod role;
mod types;

pub use cache::StatsCache;
pub use chart::{
    AxisSuggestion, ChartFieldAnalyzer, FieldAnalysis, analyze_fields_for_chart, rank_chart_fields,
    suggest_chart_axes,
};
pub use role::{RoleDetector, RoleOverrides, RoleThresholds, detect_field_role};
pub use types::{
    DEFAULT_MAX_UNIQUE_VALUES, TypeAnalyzer, TypeDetectionConfig, detect_column_type,
    detect_field_type, get_column_unique_values,
};

pub(crate) use types::DistinctKey;
