//! Row values, loaders and dataset identity.

mod parser;
mod source;
mod value;

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

pub use parser::{Parser, ParserConfig, coerce_text, rows_from_json};
pub use source::SourceMetadata;
pub use value::{Row, Value, field_value, row_from_pairs};

pub(crate) use value::compare_labels;

// Cheap prefilter before handing text to chrono.
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap(), // ISO date
        Regex::new(r"^\d{2}/\d{2}/\d{4}").unwrap(), // US date
        Regex::new(r"^\d{2}-\d{2}-\d{4}").unwrap(), // European date
        Regex::new(r"^\d{4}/\d{2}/\d{2}").unwrap(), // Alt ISO
        Regex::new(r"^(?i)(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]* \d{1,2}, \d{4}$")
            .unwrap(),
    ]
});

/// Whether text has the shape of a date. Does not validate the calendar.
pub fn looks_like_date(value: &str) -> bool {
    DATE_PATTERNS.iter().any(|pattern| pattern.is_match(value))
}

/// The ordered field set of a row collection, taken from the first row.
pub fn field_names(rows: &[Row]) -> Vec<String> {
    rows.first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default()
}

/// Content fingerprint of a row collection.
///
/// Two collections share a fingerprint when they have the same field set and
/// the same values in the same order.
pub fn fingerprint(rows: &[Row]) -> String {
    let mut hasher = Sha256::new();
    for name in field_names(rows) {
        hasher.update(name.as_bytes());
        hasher.update([0x1f]);
    }
    hasher.update([0x1e]);
    for row in rows {
        for value in row.values() {
            hasher.update([value.kind_tag()]);
            hasher.update(value.to_string().as_bytes());
            hasher.update([0x1f]);
        }
        hasher.update([0x1e]);
    }
    format!("{:x}", hasher.finalize())
}
