//! Per-period aggregate records.

use crate::period::{compare_period_keys, PeriodKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One period's metric values. Serializes flat: `{"period": "2024-01-01", "<metric>": n, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    /// Bucket this record covers
    pub period: PeriodKey,
    /// Metric name to value
    #[serde(flatten)]
    pub metrics: BTreeMap<String, f64>,
}

impl AggregatedRecord {
    /// Empty record for `period`.
    pub fn new(period: PeriodKey) -> Self {
        Self {
            period,
            metrics: BTreeMap::new(),
        }
    }

    /// Value of `metric`, if the record carries it.
    pub fn value(&self, metric: &str) -> Option<f64> {
        self.metrics.get(metric).copied()
    }

    /// Value of `metric`, absent fields reading as 0.
    pub fn value_or_zero(&self, metric: &str) -> f64 {
        self.value(metric).unwrap_or(0.0)
    }

    /// Metric names carried by this record, sorted.
    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }
}

/// Sorts records chronologically by period key.
pub fn sort_records(records: &mut [AggregatedRecord]) {
    records.sort_by(|a, b| compare_period_keys(a.period.as_str(), b.period.as_str()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_serialization() {
        let mut record = AggregatedRecord::new(PeriodKey::from("2024-Q1"));
        record.metrics.insert("Total unique sessions".to_string(), 30.0);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["period"], "2024-Q1");
        assert_eq!(json["Total unique sessions"], 30.0);

        let back: AggregatedRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_sort_records_by_quarter() {
        let mut records: Vec<AggregatedRecord> = ["2025-Q1", "2024-Q3", "2024-Q4"]
            .into_iter()
            .map(|k| AggregatedRecord::new(PeriodKey::from(k)))
            .collect();
        sort_records(&mut records);
        let keys: Vec<&str> = records.iter().map(|r| r.period.as_str()).collect();
        assert_eq!(keys, vec!["2024-Q3", "2024-Q4", "2025-Q1"]);
    }

    #[test]
    fn test_missing_metric_reads_zero() {
        let record = AggregatedRecord::new(PeriodKey::from("2024"));
        assert_eq!(record.value("anything"), None);
        assert_eq!(record.value_or_zero("anything"), 0.0);
    }
}
