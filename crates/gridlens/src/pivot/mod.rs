//! Pivot tables: configuration, grouping keys, aggregation, calculated
//! fields and layout persistence.

mod accumulator;
mod config;
mod engine;
pub mod formula;
mod key;
mod persistence;
mod result;

pub use accumulator::Accumulator;
pub use config::{
    Aggregation, CALCULATED_FIELD_PREFIX, CalculatedField, ConfigError, PivotConfig,
    ValueFieldRef, is_pivot_configured,
};
pub use engine::compute_pivot_result;
pub use formula::{FormulaError, MAX_FORMULA_DEPTH, evaluate_formula, parse_formula};
pub use key::{BLANK_TOKEN, KEY_DELIMITER, join_parts, key_part, make_key, parse_key};
pub use persistence::{
    ConfigStore, MemoryConfigStore, STORAGE_KEY_PREFIX, generate_storage_key,
    is_config_valid_for_fields, load_pivot_config, restore_pivot_config, save_for_fields,
    save_pivot_config,
};
pub use result::{PivotResult, ValueColumn, ValueVector};
