//! Grid sorting and pivot axis ordering.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::input::{Row, compare_labels, field_value};
use crate::pivot::{BLANK_TOKEN, parse_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// One key of a multi-column grid sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Sort rows by `specs`, first spec most significant.
///
/// The sort is stable. Blanks go last in either direction.
pub fn sort_rows<'a>(rows: &'a [Row], specs: &[SortSpec]) -> Vec<&'a Row> {
    let mut sorted: Vec<&Row> = rows.iter().collect();
    sorted.sort_by(|a, b| {
        for spec in specs {
            let va = field_value(a, &spec.field);
            let vb = field_value(b, &spec.field);
            let ordering = match (va.is_blank(), vb.is_blank()) {
                (false, false) => directed(va.sort_cmp(vb), spec.direction),
                _ => va.sort_cmp(vb),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    sorted
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Ordering of a pivot axis.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum KeyOrder {
    /// Natural label order per component, numbers numerically.
    #[default]
    Ascending,
    Descending,
    /// First appearance in the source rows.
    SourceOrder,
    /// By the total of one value column; blank totals last, ties by label.
    #[serde(rename_all = "camelCase")]
    ByValue { value_index: usize, descending: bool },
}

/// Compare two composite keys component by component. Blank components
/// sort last regardless of `direction`.
pub fn compare_keys(a: &str, b: &str, direction: SortDirection) -> Ordering {
    let pa = parse_key(a);
    let pb = parse_key(b);
    for (x, y) in pa.iter().zip(pb.iter()) {
        let ordering = match (x == BLANK_TOKEN, y == BLANK_TOKEN) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => directed(compare_labels(x, y), direction),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    pa.len().cmp(&pb.len())
}

/// Order axis keys in place. `total` looks up a key's total for the
/// `ByValue` order.
pub fn sort_keys(keys: &mut [String], order: &KeyOrder, total: impl Fn(&str, usize) -> Option<f64>) {
    match order {
        KeyOrder::SourceOrder => {}
        KeyOrder::Ascending => keys.sort_by(|a, b| compare_keys(a, b, SortDirection::Ascending)),
        KeyOrder::Descending => keys.sort_by(|a, b| compare_keys(a, b, SortDirection::Descending)),
        KeyOrder::ByValue {
            value_index,
            descending,
        } => keys.sort_by(|a, b| {
            let by_value = match (total(a, *value_index), total(b, *value_index)) {
                (Some(x), Some(y)) => {
                    let ordering = x.total_cmp(&y);
                    if *descending { ordering.reverse() } else { ordering }
                }
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_value.then_with(|| compare_keys(a, b, SortDirection::Ascending))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Value, row_from_pairs};

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_ascending_keys_are_numeric_aware_with_blanks_last() {
        let mut k = keys(&["10", "(blank)", "9", "b", "a"]);
        sort_keys(&mut k, &KeyOrder::Ascending, |_, _| None);
        assert_eq!(k, keys(&["9", "10", "a", "b", "(blank)"]));
    }

    #[test]
    fn test_descending_keeps_blanks_last() {
        let mut k = keys(&["a", "(blank)", "c", "b"]);
        sort_keys(&mut k, &KeyOrder::Descending, |_, _| None);
        assert_eq!(k, keys(&["c", "b", "a", "(blank)"]));
    }

    #[test]
    fn test_composite_keys_compare_per_component() {
        let mut k = keys(&["West|||Q1", "East|||Q2", "East|||(blank)", "East|||Q1"]);
        sort_keys(&mut k, &KeyOrder::Ascending, |_, _| None);
        assert_eq!(k, keys(&["East|||Q1", "East|||Q2", "East|||(blank)", "West|||Q1"]));
    }

    #[test]
    fn test_by_value() {
        let mut k = keys(&["a", "b", "c", "d"]);
        let totals = |key: &str, _: usize| match key {
            "a" => Some(5.0),
            "b" => Some(20.0),
            "c" => None,
            _ => Some(5.0),
        };
        sort_keys(
            &mut k,
            &KeyOrder::ByValue {
                value_index: 0,
                descending: true,
            },
            totals,
        );
        assert_eq!(k, keys(&["b", "a", "d", "c"]));
    }

    #[test]
    fn test_source_order_is_untouched() {
        let mut k = keys(&["z", "a"]);
        sort_keys(&mut k, &KeyOrder::SourceOrder, |_, _| None);
        assert_eq!(k, keys(&["z", "a"]));
    }

    #[test]
    fn test_sort_rows_multi_key_and_stable() {
        let rows = vec![
            row_from_pairs([("id", Value::from(1i64)), ("region", Value::from("West")), ("sales", Value::from(5.0))]),
            row_from_pairs([("id", Value::from(2i64)), ("region", Value::from("East")), ("sales", Value::Null)]),
            row_from_pairs([("id", Value::from(3i64)), ("region", Value::from("East")), ("sales", Value::from(9.0))]),
            row_from_pairs([("id", Value::from(4i64)), ("region", Value::from("West")), ("sales", Value::from(5.0))]),
        ];
        let sorted = sort_rows(
            &rows,
            &[SortSpec::ascending("region"), SortSpec::descending("sales")],
        );
        let ids: Vec<String> = sorted.iter().map(|r| field_value(r, "id").to_string()).collect();
        assert_eq!(ids, vec!["3", "2", "1", "4"]);
    }
}
