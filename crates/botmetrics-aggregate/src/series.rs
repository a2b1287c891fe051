//! Chart-ready series: one ordered sequence of `(period, value)` per metric.

use crate::period::PeriodKey;
use crate::record::AggregatedRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One x/y point of a chart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub period: PeriodKey,
    pub value: f64,
}

/// Metric name to its points, in record order.
pub type ChartSeries = BTreeMap<String, Vec<ChartPoint>>;

/// Pivots records into per-metric series.
///
/// Metrics are the union across all records; a record lacking a metric contributes 0.
/// Every series has exactly one point per record.
pub fn format_series(records: &[AggregatedRecord]) -> ChartSeries {
    let names: BTreeSet<&str> = records.iter().flat_map(|r| r.metric_names()).collect();

    names
        .into_iter()
        .map(|name| {
            let points = records
                .iter()
                .map(|record| ChartPoint {
                    period: record.period.clone(),
                    value: record.value_or_zero(name),
                })
                .collect();
            (name.to_string(), points)
        })
        .collect()
}
