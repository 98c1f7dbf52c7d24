//! Caller-owned cache of per-field statistics.

use std::collections::HashMap;

use crate::input::{Row, fingerprint};
use crate::schema::FieldStats;

use super::types::TypeAnalyzer;

/// Memoizes [`FieldStats`] for one row set.
///
/// The owner announces each new row set with [`StatsCache::reset_for`], which
/// hashes the rows once and keeps the entries when the content is unchanged.
/// Lookups only compare the row count, so a caller that swaps rows without
/// calling `reset_for` still loses stale entries when the length differs.
/// Each owner keeps its own cache, so independent datasets never interfere.
#[derive(Debug, Clone, Default)]
pub struct StatsCache {
    fingerprint: Option<String>,
    row_count: usize,
    generation: u64,
    entries: HashMap<String, FieldStats>,
    analyzer: TypeAnalyzer,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache computing stats with `analyzer`.
    pub fn with_analyzer(analyzer: TypeAnalyzer) -> Self {
        Self {
            analyzer,
            ..Self::default()
        }
    }

    /// Bind the cache to `rows`, dropping entries if the content changed.
    pub fn reset_for(&mut self, rows: &[Row]) {
        let print = fingerprint(rows);
        if self.fingerprint.as_deref() == Some(print.as_str()) {
            return;
        }
        if !self.entries.is_empty() {
            tracing::debug!(cached = self.entries.len(), "row set changed, dropping field stats");
        }
        self.entries.clear();
        self.fingerprint = Some(print);
        self.row_count = rows.len();
        self.generation += 1;
    }

    /// Stats for `field`, computed on first request for this row set.
    pub fn field_stats(&mut self, rows: &[Row], field: &str) -> &FieldStats {
        if self.fingerprint.is_none() || rows.len() != self.row_count {
            self.reset_for(rows);
        }
        let analyzer = &self.analyzer;
        self.entries
            .entry(field.to_string())
            .or_insert_with(|| analyzer.detect_field_type(rows, field))
    }

    /// Incremented every time the cached entries are invalidated.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of cached fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached entry.
    pub fn clear(&mut self) {
        self.fingerprint = None;
        self.row_count = 0;
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Value, row_from_pairs};

    #[test]
    fn test_cache_reuses_and_invalidates() {
        let rows_a = vec![row_from_pairs([("n", Value::from(1.0))])];
        let rows_b = vec![row_from_pairs([("n", Value::from("x"))])];

        let mut cache = StatsCache::new();
        cache.reset_for(&rows_a);
        assert!(cache.field_stats(&rows_a, "n").is_numeric);
        assert_eq!(cache.len(), 1);
        assert!(cache.field_stats(&rows_a, "n").is_numeric);
        assert_eq!(cache.len(), 1);

        cache.reset_for(&rows_b);
        assert!(!cache.field_stats(&rows_b, "n").is_numeric);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lookups_do_not_rehash() {
        let rows: Vec<Row> = (0..50)
            .map(|i| row_from_pairs([("n", Value::from(i as f64)), ("s", Value::from("a"))]))
            .collect();

        let mut cache = StatsCache::new();
        cache.reset_for(&rows);
        assert_eq!(cache.generation(), 1);
        for _ in 0..10 {
            cache.field_stats(&rows, "n");
            cache.field_stats(&rows, "s");
        }
        assert_eq!(cache.generation(), 1);
        assert_eq!(cache.len(), 2);

        // Same content again keeps the entries.
        cache.reset_for(&rows.clone());
        assert_eq!(cache.generation(), 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_length_change_invalidates_without_reset() {
        let long: Vec<Row> = (0..3).map(|_| row_from_pairs([("n", Value::from(1.0))])).collect();
        let short = vec![row_from_pairs([("n", Value::from("x"))])];

        let mut cache = StatsCache::new();
        assert!(cache.field_stats(&long, "n").is_numeric);
        assert!(!cache.field_stats(&short, "n").is_numeric);
        assert_eq!(cache.generation(), 2);
    }
}
