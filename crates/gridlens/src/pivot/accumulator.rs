//! Running aggregate state for one group and one value field.

use std::collections::HashSet;

use crate::inference::DistinctKey;
use crate::input::Value;

use super::config::Aggregation;

/// Streaming accumulator over a group's raw values.
///
/// Totals keep their own accumulators fed with the same raw values as the
/// cells, so every aggregation (average and distinct count included) is
/// computed over the underlying rows, never over sub-aggregates.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    /// Rows seen, blanks included.
    pub count: u64,
    /// Rows holding a numeric value.
    pub count_numbers: u64,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Welford running mean and sum of squared differences.
    mean: f64,
    m2: f64,
    distinct: Option<HashSet<DistinctKey>>,
    samples: Option<Vec<f64>>,
}

impl Accumulator {
    /// An accumulator keeping only the state `aggregation` needs beyond the
    /// running counters.
    pub fn for_aggregation(aggregation: Aggregation) -> Self {
        Self {
            distinct: (aggregation == Aggregation::CountDistinct).then(HashSet::new),
            samples: (aggregation == Aggregation::Median).then(Vec::new),
            ..Self::default()
        }
    }

    /// Feed one raw value.
    ///
    /// Numeric text counts as a number; booleans and dates do not.
    pub fn add(&mut self, value: &Value) {
        self.count += 1;

        if let Some(distinct) = self.distinct.as_mut() {
            if !value.is_blank() {
                distinct.insert(DistinctKey::of(value));
            }
        }

        if let Some(n) = value.as_f64() {
            self.add_number(n);
        }
    }

    fn add_number(&mut self, value: f64) {
        self.count_numbers += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));

        let delta = value - self.mean;
        self.mean += delta / self.count_numbers as f64;
        self.m2 += delta * (value - self.mean);

        if let Some(samples) = self.samples.as_mut() {
            samples.push(value);
        }
    }

    /// Final value for `aggregation`; `None` renders as blank.
    pub fn finish(&self, aggregation: Aggregation) -> Option<f64> {
        let n = self.count_numbers;
        let value = match aggregation {
            Aggregation::Sum => Some(self.sum),
            Aggregation::Count => Some(self.count as f64),
            Aggregation::CountNumbers => Some(n as f64),
            Aggregation::Avg => (n > 0).then(|| self.sum / n as f64),
            Aggregation::Min => self.min,
            Aggregation::Max => self.max,
            Aggregation::CountDistinct => {
                Some(self.distinct.as_ref().map_or(0, HashSet::len) as f64)
            }
            Aggregation::Median => self.samples.as_deref().and_then(median),
            Aggregation::Variance => (n > 1).then(|| self.m2 / (n - 1) as f64),
            Aggregation::StdDev => (n > 1).then(|| (self.m2 / (n - 1) as f64).sqrt()),
        };
        value.filter(|v| v.is_finite())
    }
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fed(aggregation: Aggregation, values: &[Value]) -> Option<f64> {
        let mut acc = Accumulator::for_aggregation(aggregation);
        for v in values {
            acc.add(v);
        }
        acc.finish(aggregation)
    }

    fn mixed() -> Vec<Value> {
        vec![
            Value::from(4.0),
            Value::Null,
            Value::from("6"),
            Value::from("n/a"),
            Value::Bool(true),
            Value::from(2.0),
        ]
    }

    #[test]
    fn test_sum_and_count_treat_blanks_differently() {
        assert_eq!(fed(Aggregation::Sum, &mixed()), Some(12.0));
        assert_eq!(fed(Aggregation::Count, &mixed()), Some(6.0));
        assert_eq!(fed(Aggregation::CountNumbers, &mixed()), Some(3.0));
    }

    #[test]
    fn test_avg_uses_numeric_count() {
        assert_eq!(fed(Aggregation::Avg, &mixed()), Some(4.0));
        assert_eq!(fed(Aggregation::Avg, &[Value::Null, Value::from("x")]), None);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(fed(Aggregation::Min, &mixed()), Some(2.0));
        assert_eq!(fed(Aggregation::Max, &mixed()), Some(6.0));
        assert_eq!(fed(Aggregation::Min, &[Value::Null]), None);
    }

    #[test]
    fn test_count_distinct_ignores_blanks() {
        let values = vec![
            Value::from("a"),
            Value::from("b"),
            Value::from("a"),
            Value::Null,
            Value::from(""),
        ];
        assert_eq!(fed(Aggregation::CountDistinct, &values), Some(2.0));
    }

    #[test]
    fn test_median() {
        let odd: Vec<Value> = [5.0, 1.0, 3.0].into_iter().map(Value::from).collect();
        assert_eq!(fed(Aggregation::Median, &odd), Some(3.0));
        let even: Vec<Value> = [4.0, 1.0, 3.0, 2.0].into_iter().map(Value::from).collect();
        assert_eq!(fed(Aggregation::Median, &even), Some(2.5));
        assert_eq!(fed(Aggregation::Median, &[]), None);
    }

    #[test]
    fn test_sample_variance() {
        let values: Vec<Value> = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]
            .into_iter()
            .map(Value::from)
            .collect();
        let variance = fed(Aggregation::Variance, &values).unwrap();
        assert!((variance - 32.0 / 7.0).abs() < 1e-9);
        let std_dev = fed(Aggregation::StdDev, &values).unwrap();
        assert!((std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-9);
        assert_eq!(fed(Aggregation::Variance, &[Value::from(1.0)]), None);
    }

    #[test]
    fn test_empty_group() {
        assert_eq!(fed(Aggregation::Sum, &[]), Some(0.0));
        assert_eq!(fed(Aggregation::Count, &[]), Some(0.0));
        assert_eq!(fed(Aggregation::CountDistinct, &[]), Some(0.0));
        assert_eq!(fed(Aggregation::Avg, &[]), None);
    }
}
