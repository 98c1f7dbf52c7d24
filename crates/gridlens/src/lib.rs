//! GridLens: pivot aggregation and field-role inference for tabular rows.
//!
//! GridLens takes uniform row records (from CSV, JSON or a query layer) and
//! derives what an analytics grid needs from them: per-field types and
//! statistics, a dimension/measure/temporal role per field, and pivot tables
//! with totals and calculated fields.
//!
//! # Core Principles
//!
//! - **Pure**: every computation is a function of (rows, config); inputs are
//!   never mutated
//! - **Blank-aware**: null, missing and empty values form one explicit
//!   `(blank)` group and are never silently dropped
//! - **Forgiving**: incomplete configs yield `None`, bad cells yield blank
//!   values; only loaders and explicit validation return errors
//!
//! # Example
//!
//! ```
//! use gridlens::{Aggregation, GridLens, PivotConfig, rows_from_json};
//!
//! let rows = rows_from_json(r#"[
//!     {"region": "East", "quarter": "Q1", "sales": 100},
//!     {"region": "West", "quarter": "Q1", "sales": 80},
//!     {"region": "East", "quarter": "Q2", "sales": 150}
//! ]"#).unwrap();
//!
//! let lens = GridLens::new(rows);
//! let config = PivotConfig::new()
//!     .row("region")
//!     .column("quarter")
//!     .value("sales", Aggregation::Sum);
//!
//! let result = lens.pivot(&config).unwrap();
//! assert_eq!(result.value("East", "Q2", 0), Some(150.0));
//! assert_eq!(result.row_total("East", 0), Some(250.0));
//! ```

pub mod error;
pub mod inference;
pub mod input;
pub mod pivot;
pub mod schema;
pub mod view;

mod gridlens;

pub use crate::gridlens::{GridLens, GridLensConfig};
pub use error::{GridLensError, Result};
pub use inference::{
    AxisSuggestion, FieldAnalysis, RoleOverrides, RoleThresholds, StatsCache,
    analyze_fields_for_chart, detect_column_type, detect_field_role, detect_field_type,
    get_column_unique_values, rank_chart_fields, suggest_chart_axes,
};
pub use input::{Parser, ParserConfig, Row, SourceMetadata, Value, rows_from_json};
pub use pivot::{
    Aggregation, CalculatedField, ConfigError, ConfigStore, FormulaError, MemoryConfigStore,
    PivotConfig, PivotResult, ValueFieldRef, compute_pivot_result, evaluate_formula,
    generate_storage_key, is_config_valid_for_fields, is_pivot_configured, load_pivot_config,
    make_key, parse_key, save_pivot_config,
};
pub use schema::{ColumnValues, FieldRole, FieldStats, FieldType};
pub use view::{KeyOrder, RowFilter, SortSpec, filter_rows, sort_rows};
