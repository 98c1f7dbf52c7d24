//! Row filters.

use serde::{Deserialize, Serialize};

use crate::input::{Row, Value, field_value};
use crate::pivot::key_part;

/// Numeric comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumberOp {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    /// Inclusive range `value..=to`; bounds may be given in either order.
    Between,
}

/// Text match operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextOp {
    Contains,
    NotContains,
    Equals,
    BeginsWith,
    EndsWith,
}

/// A predicate over one field of a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RowFilter {
    /// Keep rows whose rendered value is in `values`. Blanks render as
    /// `(blank)`, so listing it keeps blank rows.
    Values { field: String, values: Vec<String> },
    /// Keep rows whose value is numeric and satisfies the comparison.
    #[serde(rename_all = "camelCase")]
    Number {
        field: String,
        op: NumberOp,
        value: f64,
        #[serde(default)]
        to: Option<f64>,
    },
    /// Keep rows whose rendered text matches.
    #[serde(rename_all = "camelCase")]
    Text {
        field: String,
        op: TextOp,
        value: String,
        #[serde(default)]
        case_sensitive: bool,
    },
    NotBlank { field: String },
}

impl RowFilter {
    pub fn values<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RowFilter::Values {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn number(field: impl Into<String>, op: NumberOp, value: f64) -> Self {
        RowFilter::Number {
            field: field.into(),
            op,
            value,
            to: None,
        }
    }

    pub fn between(field: impl Into<String>, low: f64, high: f64) -> Self {
        RowFilter::Number {
            field: field.into(),
            op: NumberOp::Between,
            value: low,
            to: Some(high),
        }
    }

    pub fn text(field: impl Into<String>, op: TextOp, value: impl Into<String>) -> Self {
        RowFilter::Text {
            field: field.into(),
            op,
            value: value.into(),
            case_sensitive: false,
        }
    }

    pub fn not_blank(field: impl Into<String>) -> Self {
        RowFilter::NotBlank { field: field.into() }
    }

    /// The field this filter reads.
    pub fn field(&self) -> &str {
        match self {
            RowFilter::Values { field, .. }
            | RowFilter::Number { field, .. }
            | RowFilter::Text { field, .. }
            | RowFilter::NotBlank { field } => field,
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        let value = field_value(row, self.field());
        match self {
            RowFilter::Values { values, .. } => {
                let rendered = key_part(value);
                values.iter().any(|v| *v == rendered)
            }
            RowFilter::Number { op, value: target, to, .. } => match value.as_f64() {
                Some(n) => compare_number(*op, n, *target, *to),
                None => false,
            },
            RowFilter::Text {
                op,
                value: needle,
                case_sensitive,
                ..
            } => match_text(*op, value, needle, *case_sensitive),
            RowFilter::NotBlank { .. } => !value.is_blank(),
        }
    }
}

fn compare_number(op: NumberOp, n: f64, target: f64, to: Option<f64>) -> bool {
    match op {
        NumberOp::Equals => n == target,
        NumberOp::NotEquals => n != target,
        NumberOp::GreaterThan => n > target,
        NumberOp::GreaterThanOrEqual => n >= target,
        NumberOp::LessThan => n < target,
        NumberOp::LessThanOrEqual => n <= target,
        NumberOp::Between => {
            let other = to.unwrap_or(target);
            let (low, high) = if target <= other { (target, other) } else { (other, target) };
            n >= low && n <= high
        }
    }
}

fn match_text(op: TextOp, value: &Value, needle: &str, case_sensitive: bool) -> bool {
    let haystack = value.to_string();
    let (haystack, needle) = if case_sensitive {
        (haystack, needle.to_string())
    } else {
        (haystack.to_lowercase(), needle.to_lowercase())
    };
    match op {
        TextOp::Contains => haystack.contains(&needle),
        TextOp::NotContains => !haystack.contains(&needle),
        TextOp::Equals => haystack == needle,
        TextOp::BeginsWith => haystack.starts_with(&needle),
        TextOp::EndsWith => haystack.ends_with(&needle),
    }
}

/// Rows passing every filter, in input order.
pub fn filter_rows<'a>(rows: &'a [Row], filters: &[RowFilter]) -> Vec<&'a Row> {
    rows.iter()
        .filter(|row| filters.iter().all(|f| f.matches(row)))
        .collect()
}
