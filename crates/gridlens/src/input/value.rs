//! Scalar cell values and rows.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single row: field name to value, in column order.
pub type Row = IndexMap<String, Value>;

/// A scalar cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing, null or undefined.
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Native date/time value (never produced by JSON deserialization).
    Date(NaiveDateTime),
}

impl Value {
    /// Whether this value belongs to the blank category.
    ///
    /// Null and the empty string are both blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Stable tag per variant, so `1` and `"1"` stay distinct when
    /// values are compared by their rendered text.
    pub(crate) fn kind_tag(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::Text(_) => 3,
            Value::Date(_) => 4,
        }
    }

    /// Numeric view of the value, if it has one.
    ///
    /// Native numbers and numeric text both coerce; booleans and dates do not.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            Value::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Returns the native number, ignoring numeric text.
    pub fn as_native_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    /// Date view of the value: native dates and date-parseable text.
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => Some(*d),
            Value::Text(s) => parse_date(s),
            _ => None,
        }
    }

    /// Boolean view of the value: native booleans and `true`/`false` text.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Text(s) => parse_bool(s),
            _ => None,
        }
    }

    /// Compare two values for display ordering.
    ///
    /// Numbers sort numerically, dates chronologically, text lexically.
    /// Mixed kinds fall back to their string forms. Blanks sort last.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self.is_blank(), other.is_blank()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            _ => compare_labels(&self.to_string(), &other.to_string()),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => {
                if d.time() == NaiveTime::MIN {
                    write!(f, "{}", d.format("%Y-%m-%d"))
                } else if d.nanosecond() == 0 {
                    write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S"))
                } else {
                    write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S%.3f"))
                }
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d.and_time(NaiveTime::MIN))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::Text(s),
            // Nested structures are flattened to their JSON text.
            other => Value::Text(other.to_string()),
        }
    }
}

/// Look up a field in a row; absent fields read as null.
pub fn field_value<'a>(row: &'a Row, field: &str) -> &'a Value {
    static NULL: Value = Value::Null;
    row.get(field).unwrap_or(&NULL)
}

/// Build a row from `(field, value)` pairs.
pub fn row_from_pairs<K, V, I>(pairs: I) -> Row
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Parse trimmed text as a finite number.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Rust accepts "inf" and "NaN"; spreadsheets do not.
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y", "%b %d, %Y"];

/// Parse text as a date or date-time.
///
/// Accepts ISO dates and date-times (with or without an offset), plus the
/// common slash and month-name forms.
pub(crate) fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if !super::looks_like_date(trimmed) {
        return None;
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    for fmt in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// Natural label ordering: numeric labels compare numerically.
pub(crate) fn compare_labels(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_detection() {
        assert!(Value::Null.is_blank());
        assert!(Value::from("").is_blank());
        assert!(!Value::from(" ").is_blank());
        assert!(!Value::from(0.0).is_blank());
    }

    #[test]
    fn test_number_display_has_no_trailing_zero() {
        assert_eq!(Value::from(5.0).to_string(), "5");
        assert_eq!(Value::from(5.5).to_string(), "5.5");
        assert_eq!(Value::from(-3i64).to_string(), "-3");
    }

    #[test]
    fn test_date_display() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(Value::from(d).to_string(), "2024-03-09");
        let dt = d.and_hms_opt(14, 5, 0).unwrap();
        assert_eq!(Value::from(dt).to_string(), "2024-03-09T14:05:00");
    }

    #[test]
    fn test_numeric_text_coerces() {
        assert_eq!(Value::from(" 42 ").as_f64(), Some(42.0));
        assert_eq!(Value::from("42").as_native_number(), None);
        assert_eq!(Value::from("inf").as_f64(), None);
        assert_eq!(Value::Bool(true).as_f64(), None);
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("2024-01-15").is_some());
        assert!(parse_date("2024-01-15T10:30:00Z").is_some());
        assert!(parse_date("2024-01-15 10:30:00").is_some());
        assert!(parse_date("01/15/2024").is_some());
        assert!(parse_date("Jan 15, 2024").is_some());
        assert!(parse_date("hello").is_none());
        assert!(parse_date("2024-13-45").is_none());
    }

    #[test]
    fn test_sort_cmp_blanks_last() {
        let mut values = vec![Value::Null, Value::from(3.0), Value::from(1.0), Value::from("")];
        values.sort_by(|a, b| a.sort_cmp(b));
        assert_eq!(values[0], Value::from(1.0));
        assert_eq!(values[1], Value::from(3.0));
        assert!(values[2].is_blank() && values[3].is_blank());
    }

    #[test]
    fn test_from_json() {
        let v: Value = serde_json::json!(12.5).into();
        assert_eq!(v, Value::Number(12.5));
        let v: Value = serde_json::json!(null).into();
        assert_eq!(v, Value::Null);
    }

    #[test]
    fn test_missing_field_reads_null() {
        let row = row_from_pairs([("a", 1i64)]);
        assert_eq!(field_value(&row, "b"), &Value::Null);
    }
}
