//! Main GridLens struct and public API.

use crate::error::Result;
use crate::inference::{
    AxisSuggestion, ChartFieldAnalyzer, FieldAnalysis, RoleDetector, RoleOverrides,
    RoleThresholds, StatsCache, TypeAnalyzer, TypeDetectionConfig, DEFAULT_MAX_UNIQUE_VALUES,
    suggest_chart_axes,
};
use crate::input::{Parser, ParserConfig, Row, SourceMetadata, field_names, rows_from_json};
use crate::pivot::{
    ConfigStore, PivotConfig, PivotResult, compute_pivot_result, generate_storage_key,
    restore_pivot_config, save_for_fields,
};
use crate::schema::{ColumnValues, FieldRole, FieldStats};
use crate::view::{RowFilter, SortSpec, filter_rows, sort_rows};

/// Configuration for a [`GridLens`] session.
#[derive(Debug, Clone)]
pub struct GridLensConfig {
    /// Type detection settings.
    pub types: TypeDetectionConfig,
    /// Measure heuristic constants.
    pub roles: RoleThresholds,
    /// Cap on distinct values returned by [`GridLens::column_values`].
    pub max_unique_values: usize,
}

impl Default for GridLensConfig {
    fn default() -> Self {
        Self {
            types: TypeDetectionConfig::default(),
            roles: RoleThresholds::default(),
            max_unique_values: DEFAULT_MAX_UNIQUE_VALUES,
        }
    }
}

/// One working set of rows with its derived caches.
///
/// Caches live and die with the instance; two instances never share state.
#[derive(Debug, Clone)]
pub struct GridLens {
    config: GridLensConfig,
    rows: Vec<Row>,
    fields: Vec<String>,
    overrides: RoleOverrides,
    analyzer: TypeAnalyzer,
    detector: RoleDetector,
    stats: StatsCache,
}

impl GridLens {
    /// Wrap `rows` with default configuration.
    pub fn new(rows: Vec<Row>) -> Self {
        Self::with_config(rows, GridLensConfig::default())
    }

    /// Wrap `rows` with custom configuration.
    pub fn with_config(rows: Vec<Row>, config: GridLensConfig) -> Self {
        let analyzer = TypeAnalyzer::with_config(config.types.clone());
        let detector = RoleDetector::with_thresholds(config.roles.clone());
        let mut stats = StatsCache::with_analyzer(analyzer.clone());
        stats.reset_for(&rows);
        Self {
            fields: field_names(&rows),
            stats,
            analyzer,
            detector,
            overrides: RoleOverrides::new(),
            rows,
            config,
        }
    }

    /// Parse delimited text and wrap the rows.
    pub fn from_delimited(text: &str, parser: ParserConfig) -> Result<(Self, SourceMetadata)> {
        let (rows, source) = Parser::with_config(parser).parse_str(text)?;
        Ok((Self::new(rows), source))
    }

    /// Parse a JSON array of objects and wrap the rows.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(Self::new(rows_from_json(text)?))
    }

    pub fn config(&self) -> &GridLensConfig {
        &self.config
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Field names in column order, from the first row.
    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    /// Replace the rows. Cached stats are dropped if the content differs;
    /// role overrides are kept.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.stats.reset_for(&rows);
        self.fields = field_names(&rows);
        self.rows = rows;
    }

    /// Stats for `field`, cached for this row set.
    pub fn field_stats(&mut self, field: &str) -> &FieldStats {
        self.stats.field_stats(&self.rows, field)
    }

    /// Distinct values of `field`, capped at the configured maximum.
    pub fn column_values(&self, field: &str) -> ColumnValues {
        self.analyzer
            .column_unique_values(&self.rows, field, Some(self.config.max_unique_values))
    }

    /// Role of `field`, honoring overrides.
    pub fn field_role(&self, field: &str) -> FieldRole {
        self.detector.detect(&self.rows, field, Some(&self.overrides))
    }

    /// Pin `field` to `role`, or clear its override with `None`.
    pub fn set_role_override(&mut self, field: &str, role: Option<FieldRole>) {
        match role {
            Some(role) => {
                self.overrides.insert(field.to_string(), role);
            }
            None => {
                self.overrides.remove(field);
            }
        }
    }

    pub fn role_overrides(&self) -> &RoleOverrides {
        &self.overrides
    }

    /// Role and stats of every field.
    pub fn analyze_for_chart(&self) -> Vec<FieldAnalysis> {
        ChartFieldAnalyzer::with_analyzers(self.detector.clone(), self.analyzer.clone())
            .analyze(&self.rows, Some(&self.overrides))
    }

    /// Suggested chart axes, if the data has a measure to plot.
    pub fn suggest_axes(&self) -> Option<AxisSuggestion> {
        suggest_chart_axes(&self.analyze_for_chart())
    }

    /// Compute a pivot; `None` while `config` is incomplete or invalid.
    pub fn pivot(&self, config: &PivotConfig) -> Option<PivotResult> {
        compute_pivot_result(&self.rows, config)
    }

    pub fn filtered_rows(&self, filters: &[RowFilter]) -> Vec<&Row> {
        filter_rows(&self.rows, filters)
    }

    pub fn sorted_rows(&self, specs: &[SortSpec]) -> Vec<&Row> {
        sort_rows(&self.rows, specs)
    }

    /// Storage key for layouts saved against this field set.
    pub fn storage_key(&self) -> String {
        generate_storage_key(&self.fields)
    }

    /// The layout saved for this field set, or the default layout.
    pub fn restore_layout(&self, store: &dyn ConfigStore) -> PivotConfig {
        restore_pivot_config(store, &self.fields)
    }

    /// Save `config` for this field set, returning the storage key.
    pub fn save_layout(&self, store: &mut dyn ConfigStore, config: &PivotConfig) -> Result<String> {
        save_for_fields(store, &self.fields, config)
    }
}
