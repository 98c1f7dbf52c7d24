//! Computed pivot tables.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::config::ValueFieldRef;
use super::key::parse_key;

/// One value per value column, in `value_columns` order. `None` is blank.
pub type ValueVector = Vec<Option<f64>>;

/// Header of one value column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueColumn {
    pub label: String,
    pub reference: ValueFieldRef,
}

/// The output of one pivot computation.
///
/// Cells are sparse: a `(row, column)` pair with no source rows has no
/// entry. Totals are computed from the raw rows of their slice, not by
/// combining cell values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotResult {
    pub row_fields: Vec<String>,
    pub column_fields: Vec<String>,
    pub value_columns: Vec<ValueColumn>,
    /// Row keys in display order.
    pub row_keys: Vec<String>,
    /// Column keys in display order.
    pub column_keys: Vec<String>,
    /// `row key -> column key -> values`.
    pub cells: IndexMap<String, IndexMap<String, ValueVector>>,
    /// Per row key, across all columns. `None` when row totals are hidden.
    pub row_totals: Option<IndexMap<String, ValueVector>>,
    /// Per column key, across all rows. `None` when column totals are hidden.
    pub column_totals: Option<IndexMap<String, ValueVector>>,
    pub grand_total: ValueVector,
    /// Rows that passed the filters and were aggregated.
    pub source_row_count: usize,
}

impl PivotResult {
    /// Whether no rows were aggregated.
    pub fn is_empty(&self) -> bool {
        self.row_keys.is_empty() && self.column_keys.is_empty()
    }

    pub fn cell(&self, row_key: &str, column_key: &str) -> Option<&[Option<f64>]> {
        self.cells
            .get(row_key)
            .and_then(|row| row.get(column_key))
            .map(Vec::as_slice)
    }

    /// One value of a cell; `None` when the cell is absent or blank.
    pub fn value(&self, row_key: &str, column_key: &str, index: usize) -> Option<f64> {
        self.cell(row_key, column_key)?.get(index).copied().flatten()
    }

    pub fn row_total(&self, row_key: &str, index: usize) -> Option<f64> {
        self.row_totals
            .as_ref()?
            .get(row_key)?
            .get(index)
            .copied()
            .flatten()
    }

    pub fn column_total(&self, column_key: &str, index: usize) -> Option<f64> {
        self.column_totals
            .as_ref()?
            .get(column_key)?
            .get(index)
            .copied()
            .flatten()
    }

    pub fn grand_total_value(&self, index: usize) -> Option<f64> {
        self.grand_total.get(index).copied().flatten()
    }

    /// Index of the value column with `label`.
    pub fn value_index(&self, label: &str) -> Option<usize> {
        self.value_columns.iter().position(|c| c.label == label)
    }

    /// Display components of a row key, one per row field.
    pub fn row_labels(&self, row_key: &str) -> Vec<String> {
        parse_key(row_key)
    }

    /// Display components of a column key, one per column field.
    pub fn column_labels(&self, column_key: &str) -> Vec<String> {
        parse_key(column_key)
    }
}
