//! Range-wide totals over aggregated records.

use crate::classify::MetricKind;
use crate::engine::AggregationEngine;
use crate::record::AggregatedRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::instrument;

/// A single number summarizing one metric across the selected range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTotal {
    pub metric: String,
    pub kind: MetricKind,
    pub value: f64,
}

fn range_sum(records: &[AggregatedRecord], metric: &str) -> f64 {
    records.iter().map(|r| r.value_or_zero(metric)).sum()
}

impl AggregationEngine {
    /// Collapses one metric across `records` using the metric's kind.
    ///
    /// Derived metrics are recomputed from range-wide sums of their inputs, so the total
    /// does not depend on how the range was bucketed.
    pub fn totalize(&self, records: &[AggregatedRecord], metric: &str) -> f64 {
        let kind = self.classifier().classify(metric);
        match kind {
            MetricKind::Maximum => records
                .iter()
                .filter_map(|r| r.value(metric))
                .reduce(f64::max)
                .unwrap_or(0.0),
            MetricKind::Percentage | MetricKind::Average => match self.classifier().ratio(metric) {
                Some(ratio) => ratio.compute(
                    range_sum(records, &ratio.numerator),
                    range_sum(records, &ratio.denominator),
                ),
                // a derived kind with no formula has nothing to recompute from
                None => 0.0,
            },
            MetricKind::Sum => range_sum(records, metric),
        }
    }

    /// Totals for every metric present in `records`, catalog order first.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub fn totalize_all(&self, records: &[AggregatedRecord]) -> Vec<MetricTotal> {
        let names: BTreeSet<&str> = records.iter().flat_map(|r| r.metric_names()).collect();
        let mut names: Vec<&str> = names.into_iter().collect();
        names.sort_by(|a, b| self.catalog().display_order(a, b));

        names
            .into_iter()
            .map(|metric| MetricTotal {
                metric: metric.to_string(),
                kind: self.classifier().classify(metric),
                value: self.totalize(records, metric),
            })
            .collect()
    }
}

/// Totals one metric with the default engine.
pub fn totalize(records: &[AggregatedRecord], metric: &str) -> f64 {
    AggregationEngine::new().totalize(records, metric)
}

/// Totals every metric with the default engine.
pub fn totalize_all(records: &[AggregatedRecord]) -> Vec<MetricTotal> {
    AggregationEngine::new().totalize_all(records)
}
