//! Pivot configuration: the serializable description of a pivot table.
//!
//! A [`PivotConfig`] is an immutable snapshot of user intent. It is validated
//! once at the engine boundary; everything downstream works with the
//! validated, typed form.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::formula::{Expr, FormulaError, parse_formula};
use crate::view::{KeyOrder, RowFilter};

/// Prefix marking a calculated field in string-encoded value field ids.
pub const CALCULATED_FIELD_PREFIX: &str = "calc:";

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported aggregation functions for value fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Aggregation {
    #[default]
    Sum,
    /// Rows in the group, blanks included.
    Count,
    Avg,
    Min,
    Max,
    /// Distinct non-blank values.
    CountDistinct,
    /// Rows holding a numeric value.
    CountNumbers,
    Median,
    /// Sample standard deviation.
    StdDev,
    /// Sample variance.
    Variance,
}

impl Aggregation {
    pub const ALL: [Aggregation; 10] = [
        Aggregation::Sum,
        Aggregation::Count,
        Aggregation::Avg,
        Aggregation::Min,
        Aggregation::Max,
        Aggregation::CountDistinct,
        Aggregation::CountNumbers,
        Aggregation::Median,
        Aggregation::StdDev,
        Aggregation::Variance,
    ];

    /// Identifier-safe name, used as the binding suffix in formulas.
    pub fn key(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Count => "count",
            Aggregation::Avg => "avg",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::CountDistinct => "count_distinct",
            Aggregation::CountNumbers => "count_numbers",
            Aggregation::Median => "median",
            Aggregation::StdDev => "std_dev",
            Aggregation::Variance => "variance",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Aggregation::Sum => "Sum",
            Aggregation::Count => "Count",
            Aggregation::Avg => "Average",
            Aggregation::Min => "Min",
            Aggregation::Max => "Max",
            Aggregation::CountDistinct => "Distinct count",
            Aggregation::CountNumbers => "Count numbers",
            Aggregation::Median => "Median",
            Aggregation::StdDev => "StdDev",
            Aggregation::Variance => "Variance",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let agg = match normalized.as_str() {
            "sum" | "total" => Aggregation::Sum,
            "count" => Aggregation::Count,
            "avg" | "average" | "mean" => Aggregation::Avg,
            "min" => Aggregation::Min,
            "max" => Aggregation::Max,
            "count_distinct" | "countdistinct" | "distinct" => Aggregation::CountDistinct,
            "count_numbers" | "countnumbers" => Aggregation::CountNumbers,
            "median" => Aggregation::Median,
            "std_dev" | "stddev" | "stdev" => Aggregation::StdDev,
            "variance" | "var" => Aggregation::Variance,
            _ => return Err(format!("unknown aggregation '{}'", s)),
        };
        Ok(agg)
    }
}

// ============================================================================
// VALUE FIELDS
// ============================================================================

/// One entry in the values area: a raw field aggregation or a calculated field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueFieldRef {
    Raw {
        field: String,
        aggregation: Aggregation,
    },
    Calculated {
        id: String,
    },
}

impl ValueFieldRef {
    pub fn raw(field: impl Into<String>, aggregation: Aggregation) -> Self {
        ValueFieldRef::Raw {
            field: field.into(),
            aggregation,
        }
    }

    pub fn calculated(id: impl Into<String>) -> Self {
        ValueFieldRef::Calculated { id: id.into() }
    }

    /// Decode a string-encoded field id, where `calc:<id>` names a calculated field.
    pub fn from_field_id(field_id: &str, aggregation: Aggregation) -> Self {
        match field_id.strip_prefix(CALCULATED_FIELD_PREFIX) {
            Some(id) => ValueFieldRef::calculated(id),
            None => ValueFieldRef::raw(field_id, aggregation),
        }
    }

    /// Encode back to the string form accepted by [`ValueFieldRef::from_field_id`].
    pub fn field_id(&self) -> String {
        match self {
            ValueFieldRef::Raw { field, .. } => field.clone(),
            ValueFieldRef::Calculated { id } => format!("{}{}", CALCULATED_FIELD_PREFIX, id),
        }
    }

    /// The source field aggregated, for raw references.
    pub fn source_field(&self) -> Option<&str> {
        match self {
            ValueFieldRef::Raw { field, .. } => Some(field),
            ValueFieldRef::Calculated { .. } => None,
        }
    }
}

/// A user-defined formula evaluated per pivot cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedField {
    pub id: String,
    /// Display name; falls back to the id.
    #[serde(default)]
    pub name: String,
    pub formula: String,
}

impl CalculatedField {
    pub fn new(id: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            formula: formula.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { &self.id } else { &self.name }
    }
}

// ============================================================================
// CONFIG
// ============================================================================

/// Problems that make a pivot configuration unusable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("field '{0}' is on both the row and column axes")]
    FieldOnBothAxes(String),

    #[error("calculated field '{0}' is defined more than once")]
    DuplicateCalculatedField(String),

    #[error("value field references unknown calculated field '{0}'")]
    UnknownCalculatedField(String),

    #[error("calculated fields reference each other in a cycle: {}", .0.join(" -> "))]
    CircularReference(Vec<String>),

    #[error("calculated field '{id}' has an invalid formula: {source}")]
    InvalidFormula {
        id: String,
        #[source]
        source: FormulaError,
    },
}

/// Full description of a pivot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotConfig {
    #[serde(default)]
    pub row_fields: Vec<String>,
    #[serde(default)]
    pub column_fields: Vec<String>,
    #[serde(default)]
    pub value_fields: Vec<ValueFieldRef>,
    #[serde(default = "default_true")]
    pub show_row_totals: bool,
    #[serde(default = "default_true")]
    pub show_column_totals: bool,
    #[serde(default)]
    pub calculated_fields: Vec<CalculatedField>,
    /// Row filters applied before aggregation.
    #[serde(default)]
    pub filters: Vec<RowFilter>,
    #[serde(default)]
    pub row_order: KeyOrder,
    #[serde(default)]
    pub column_order: KeyOrder,
}

fn default_true() -> bool {
    true
}

impl Default for PivotConfig {
    fn default() -> Self {
        Self {
            row_fields: Vec::new(),
            column_fields: Vec::new(),
            value_fields: Vec::new(),
            show_row_totals: true,
            show_column_totals: true,
            calculated_fields: Vec::new(),
            filters: Vec::new(),
            row_order: KeyOrder::default(),
            column_order: KeyOrder::default(),
        }
    }
}

impl PivotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row field.
    pub fn row(mut self, field: impl Into<String>) -> Self {
        self.row_fields.push(field.into());
        self
    }

    /// Append a column field.
    pub fn column(mut self, field: impl Into<String>) -> Self {
        self.column_fields.push(field.into());
        self
    }

    /// Append a raw value field.
    pub fn value(mut self, field: impl Into<String>, aggregation: Aggregation) -> Self {
        self.value_fields.push(ValueFieldRef::raw(field, aggregation));
        self
    }

    /// Define a calculated field and show it in the values area.
    pub fn calculated(mut self, field: CalculatedField) -> Self {
        self.value_fields.push(ValueFieldRef::calculated(field.id.clone()));
        self.calculated_fields.push(field);
        self
    }

    pub fn filter(mut self, filter: RowFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn totals(mut self, rows: bool, columns: bool) -> Self {
        self.show_row_totals = rows;
        self.show_column_totals = columns;
        self
    }

    /// Whether the config is ready to compute: at least one axis field and
    /// at least one value field.
    pub fn is_configured(&self) -> bool {
        (!self.row_fields.is_empty() || !self.column_fields.is_empty())
            && !self.value_fields.is_empty()
    }

    /// Look up a calculated field by id.
    pub fn calculated_field(&self, id: &str) -> Option<&CalculatedField> {
        self.calculated_fields.iter().find(|c| c.id == id)
    }

    /// Every source field the config depends on, in first-use order.
    ///
    /// Includes the fields that calculated-field formulas read through
    /// their bindings, so `discount_sum` contributes `discount`. Formulas
    /// that fail to parse contribute nothing.
    pub fn referenced_fields(&self) -> Vec<String> {
        let structural = self
            .row_fields
            .iter()
            .chain(self.column_fields.iter())
            .map(String::as_str)
            .chain(self.value_fields.iter().filter_map(ValueFieldRef::source_field))
            .chain(self.filters.iter().map(RowFilter::field))
            .map(str::to_string);

        let mut fields: Vec<String> = Vec::new();
        for field in structural.chain(self.formula_fields()) {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        fields
    }

    /// Source fields behind formula references that are not calculated ids.
    fn formula_fields(&self) -> Vec<String> {
        let calc_ids: HashSet<&str> = self.calculated_fields.iter().map(|c| c.id.as_str()).collect();
        self.calculated_fields
            .iter()
            .filter_map(|calc| parse_formula(&calc.formula).ok())
            .flat_map(|expr| {
                expr.references()
                    .into_iter()
                    .filter(|name| !calc_ids.contains(name))
                    .map(|name| self.binding_field(name))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// The source field a formula name reads.
    ///
    /// Names of displayed value fields (`revenue_avg`, or bare `revenue`)
    /// bind to that field; anything else goes through [`split_binding`].
    fn binding_field(&self, name: &str) -> String {
        for value in &self.value_fields {
            if let ValueFieldRef::Raw { field, aggregation } = value {
                if name == field || name == format!("{}_{}", field, aggregation.key()) {
                    return field.clone();
                }
            }
        }
        split_binding(name).0.to_string()
    }

    /// Check the structural rules: axis overlap, calculated field ids,
    /// formula syntax and reference cycles.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ordered_calculations().map(|_| ())
    }

    /// Validate and return calculated fields parsed, in dependency order.
    pub(crate) fn ordered_calculations(&self) -> Result<Vec<(&CalculatedField, Expr)>, ConfigError> {
        let columns: HashSet<&str> = self.column_fields.iter().map(String::as_str).collect();
        if let Some(field) = self.row_fields.iter().find(|f| columns.contains(f.as_str())) {
            return Err(ConfigError::FieldOnBothAxes(field.clone()));
        }

        let mut parsed: HashMap<&str, (&CalculatedField, Expr)> = HashMap::new();
        for calc in &self.calculated_fields {
            if parsed.contains_key(calc.id.as_str()) {
                return Err(ConfigError::DuplicateCalculatedField(calc.id.clone()));
            }
            let expr = parse_formula(&calc.formula).map_err(|source| ConfigError::InvalidFormula {
                id: calc.id.clone(),
                source,
            })?;
            parsed.insert(calc.id.as_str(), (calc, expr));
        }

        for value in &self.value_fields {
            if let ValueFieldRef::Calculated { id } = value {
                if !parsed.contains_key(id.as_str()) {
                    return Err(ConfigError::UnknownCalculatedField(id.clone()));
                }
            }
        }

        let order = dependency_order(&self.calculated_fields, &parsed)?;
        Ok(order
            .into_iter()
            .filter_map(|id| parsed.remove(id))
            .collect())
    }
}

/// Split a formula name into `(field, aggregation)`.
///
/// `revenue_avg` is the average of `revenue`; a name without an aggregation
/// suffix is the sum of the field with that name.
pub(crate) fn split_binding(name: &str) -> (&str, Aggregation) {
    let mut aggregations = Aggregation::ALL;
    aggregations.sort_by_key(|a| std::cmp::Reverse(a.key().len()));
    for aggregation in aggregations {
        let field = name
            .strip_suffix(aggregation.key())
            .and_then(|rest| rest.strip_suffix('_'));
        if let Some(field) = field.filter(|f| !f.is_empty()) {
            return (field, aggregation);
        }
    }
    (name, Aggregation::Sum)
}

/// Whether `config` is ready to compute.
pub fn is_pivot_configured(config: &PivotConfig) -> bool {
    config.is_configured()
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

/// Topologically order calculated fields, rejecting cycles.
fn dependency_order<'a>(
    calcs: &'a [CalculatedField],
    parsed: &HashMap<&'a str, (&'a CalculatedField, Expr)>,
) -> Result<Vec<&'a str>, ConfigError> {
    fn visit<'a>(
        id: &'a str,
        parsed: &HashMap<&'a str, (&'a CalculatedField, Expr)>,
        marks: &mut HashMap<&'a str, Mark>,
        path: &mut Vec<&'a str>,
        order: &mut Vec<&'a str>,
    ) -> Result<(), ConfigError> {
        match marks.get(id) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = path.iter().position(|p| *p == id).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
                cycle.push(id.to_string());
                return Err(ConfigError::CircularReference(cycle));
            }
            None => {}
        }

        marks.insert(id, Mark::Visiting);
        path.push(id);
        if let Some((_, expr)) = parsed.get(id) {
            for reference in expr.references() {
                if let Some(&(dep, _)) = parsed.get(reference) {
                    visit(dep.id.as_str(), parsed, marks, path, order)?;
                }
            }
        }
        path.pop();
        marks.insert(id, Mark::Done);
        order.push(id);
        Ok(())
    }

    let mut marks = HashMap::new();
    let mut path = Vec::new();
    let mut order = Vec::new();
    for calc in calcs {
        visit(calc.id.as_str(), parsed, &mut marks, &mut path, &mut order)?;
    }
    Ok(order)
}
