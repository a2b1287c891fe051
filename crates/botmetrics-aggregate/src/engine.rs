//! Aggregation engine: folds raw metric series into one record per calendar period.

use crate::catalog::MetricCatalog;
use crate::classify::{MetricClassifier, MetricKind};
use crate::period::{resolve_period, PeriodKey};
use crate::record::AggregatedRecord;
use botmetrics_common::{Frequency, MetricsError, RawMetricSeries, Result};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, instrument, warn};

/// Accumulator for one metric within one period. Starts unset, never as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Cell(Option<f64>);

impl Cell {
    fn fold(&mut self, kind: MetricKind, incoming: f64) {
        self.0 = Some(match (self.0, kind) {
            (None, _) => incoming,
            (Some(current), MetricKind::Maximum) => current.max(incoming),
            (Some(current), _) => current + incoming,
        });
    }

    fn value_or_zero(self) -> f64 {
        self.0.unwrap_or(0.0)
    }
}

/// Cells for one period, keyed by metric name.
#[derive(Debug)]
struct Bucket<'a> {
    key: PeriodKey,
    cells: HashMap<&'a str, Cell>,
}

/// A raw point that already has a period; produced before any bucket is touched.
struct ResolvedPoint<'a> {
    key: PeriodKey,
    metric: &'a str,
    kind: MetricKind,
    value: f64,
}

/// Stateless aggregation engine. Holds only the classification table and catalog.
#[derive(Debug, Clone, Default)]
pub struct AggregationEngine {
    classifier: MetricClassifier,
    catalog: MetricCatalog,
}

impl AggregationEngine {
    /// Engine with the default session-metric table and catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with a custom classification table.
    pub fn with_classifier(classifier: MetricClassifier) -> Self {
        Self {
            classifier,
            catalog: MetricCatalog::default(),
        }
    }

    /// Replaces the metric catalog.
    pub fn with_catalog(mut self, catalog: MetricCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Classification table in use.
    pub fn classifier(&self) -> &MetricClassifier {
        &self.classifier
    }

    /// Catalog in use.
    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    /// Groups raw points by period, reduces them per metric kind, and derives composite metrics.
    ///
    /// Records come back in the order their period was first encountered. Every record carries
    /// every raw metric name seen in the input plus every derived metric, defaulting to 0.
    ///
    /// # Errors
    ///
    /// [`MetricsError::MalformedInput`] when any timestamp cannot be parsed. No partial
    /// result is produced.
    #[instrument(skip(self, raw), fields(series = raw.len(), frequency = %frequency))]
    pub fn aggregate(
        &self,
        raw: &[RawMetricSeries],
        frequency: Frequency,
    ) -> Result<Vec<AggregatedRecord>> {
        let mut metric_names: BTreeSet<&str> = BTreeSet::new();
        let mut resolved: Vec<ResolvedPoint<'_>> = Vec::new();

        for series in raw {
            let kind = self.classifier.classify(&series.metric);
            if kind.is_derived() {
                warn!(
                    metric = %series.metric,
                    points = series.values.len(),
                    "Skipping raw series for a derived metric; it is recomputed per period"
                );
                continue;
            }
            metric_names.insert(series.metric.as_str());

            for point in &series.values {
                let period = resolve_period(&point.period, frequency).map_err(|e| {
                    MetricsError::malformed_input_with_source(&series.metric, &point.period, e)
                })?;
                resolved.push(ResolvedPoint {
                    key: period.key(),
                    metric: series.metric.as_str(),
                    kind,
                    value: point.value_or_zero(),
                });
            }
        }

        let point_count = resolved.len();
        let mut index: HashMap<PeriodKey, usize> = HashMap::new();
        let mut buckets: Vec<Bucket<'_>> = Vec::new();

        for point in resolved {
            let slot = match index.get(&point.key) {
                Some(&slot) => slot,
                None => {
                    index.insert(point.key.clone(), buckets.len());
                    buckets.push(Bucket {
                        key: point.key,
                        cells: HashMap::new(),
                    });
                    buckets.len() - 1
                }
            };
            buckets[slot]
                .cells
                .entry(point.metric)
                .or_default()
                .fold(point.kind, point.value);
        }

        let records: Vec<AggregatedRecord> = buckets
            .into_iter()
            .map(|bucket| self.finalize(bucket, &metric_names))
            .collect();

        debug!(
            "Aggregated {} points from {} metrics into {} {} periods",
            point_count,
            metric_names.len(),
            records.len(),
            frequency
        );
        Ok(records)
    }

    /// Fills absent metrics with 0 and computes the derived metrics from period sums.
    fn finalize(&self, bucket: Bucket<'_>, metric_names: &BTreeSet<&str>) -> AggregatedRecord {
        let mut record = AggregatedRecord::new(bucket.key);
        for name in metric_names {
            let value = bucket.cells.get(name).copied().unwrap_or_default().value_or_zero();
            record.metrics.insert((*name).to_string(), value);
        }
        for ratio in self.classifier.ratios() {
            let value = ratio.compute(
                record.value_or_zero(&ratio.numerator),
                record.value_or_zero(&ratio.denominator),
            );
            record.metrics.insert(ratio.name.clone(), value);
        }
        record
    }
}

/// Aggregates with the default engine.
///
/// # Errors
///
/// See [`AggregationEngine::aggregate`].
pub fn aggregate(raw: &[RawMetricSeries], frequency: Frequency) -> Result<Vec<AggregatedRecord>> {
    AggregationEngine::new().aggregate(raw, frequency)
}
