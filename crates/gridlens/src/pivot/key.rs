//! Composite group keys.
//!
//! A key is the ordered tuple of a row's values for the grouping fields,
//! joined with [`KEY_DELIMITER`]. Blank values become [`BLANK_TOKEN`] first,
//! so null, missing and empty-string cells all land in one group.
//!
//! No escaping is performed. A value that itself contains the delimiter
//! produces a key that does not split back into the original tuple.

use crate::input::{Row, Value, field_value};

/// Separator between tuple components.
pub const KEY_DELIMITER: &str = "|||";

/// Placeholder for blank components.
pub const BLANK_TOKEN: &str = "(blank)";

/// Render one component of a key.
pub fn key_part(value: &Value) -> String {
    if value.is_blank() {
        BLANK_TOKEN.to_string()
    } else {
        value.to_string()
    }
}

/// Build the key of `row` over `fields`. No fields give the empty key.
pub fn make_key<S: AsRef<str>>(row: &Row, fields: &[S]) -> String {
    join_parts(fields.iter().map(|f| key_part(field_value(row, f.as_ref()))))
}

/// Join already-rendered components into a key.
pub fn join_parts<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut key = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            key.push_str(KEY_DELIMITER);
        }
        key.push_str(part.as_ref());
    }
    key
}

/// Split a key back into its components.
///
/// The empty key is the zero-field tuple. A single-field key is never
/// empty, since blanks render as [`BLANK_TOKEN`].
pub fn parse_key(key: &str) -> Vec<String> {
    if key.is_empty() {
        return Vec::new();
    }
    key.split(KEY_DELIMITER).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::row_from_pairs;

    #[test]
    fn test_make_key() {
        let row = row_from_pairs([("region", Value::from("East")), ("year", Value::from(2024i64))]);
        assert_eq!(make_key(&row, &["region", "year"]), "East|||2024");
        assert_eq!(make_key(&row, &["year"]), "2024");
    }

    #[test]
    fn test_blank_representations_share_a_key() {
        let null = row_from_pairs([("region", Value::Null)]);
        let empty = row_from_pairs([("region", Value::from(""))]);
        let missing = row_from_pairs([("other", Value::from("x"))]);

        assert_eq!(make_key(&null, &["region"]), BLANK_TOKEN);
        assert_eq!(make_key(&empty, &["region"]), BLANK_TOKEN);
        assert_eq!(make_key(&missing, &["region"]), BLANK_TOKEN);
    }

    #[test]
    fn test_zero_fields() {
        let row = row_from_pairs([("a", 1i64)]);
        let fields: [&str; 0] = [];
        assert_eq!(make_key(&row, &fields), "");
        assert!(parse_key("").is_empty());
    }

    #[test]
    fn test_round_trip() {
        let row = row_from_pairs([
            ("a", Value::from("x")),
            ("b", Value::Null),
            ("c", Value::from(1.5)),
        ]);
        let key = make_key(&row, &["a", "b", "c"]);
        assert_eq!(parse_key(&key), vec!["x", BLANK_TOKEN, "1.5"]);
        assert_eq!(join_parts(parse_key(&key)), key);
    }

    #[test]
    fn test_delimiter_in_value_is_not_escaped() {
        let row = row_from_pairs([("a", "x|||y")]);
        assert_eq!(parse_key(&make_key(&row, &["a"])).len(), 2);
    }
}
