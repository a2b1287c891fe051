//! Dashboard projection: raw series and a frequency in, everything a dashboard renders out.

use crate::engine::AggregationEngine;
use crate::record::AggregatedRecord;
use crate::series::{format_series, ChartSeries};
use crate::summary::SummaryCard;
use botmetrics_common::{Frequency, RawMetricSeries, Result};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Everything the dashboard shows for one frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub frequency: Frequency,
    pub records: Vec<AggregatedRecord>,
    pub series: ChartSeries,
    pub cards: Vec<SummaryCard>,
}

impl DashboardView {
    /// View of no data at `frequency`.
    pub fn empty(frequency: Frequency) -> Self {
        Self {
            frequency,
            records: Vec::new(),
            series: ChartSeries::new(),
            cards: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl AggregationEngine {
    /// Aggregates `raw` and derives series and cards from the same records.
    ///
    /// Holds no state between calls.
    #[instrument(skip(self, raw), fields(frequency = %frequency))]
    pub fn project(&self, raw: &[RawMetricSeries], frequency: Frequency) -> Result<DashboardView> {
        let records = self.aggregate(raw, frequency)?;
        let series = format_series(&records);
        let cards = self.summary_cards(&records);
        Ok(DashboardView {
            frequency,
            records,
            series,
            cards,
        })
    }
}

/// Projects with the default engine.
///
/// # Errors
///
/// Whatever [`AggregationEngine::aggregate`] rejects.
pub fn project(raw: &[RawMetricSeries], frequency: Frequency) -> Result<DashboardView> {
    AggregationEngine::new().project(raw, frequency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names;
    use botmetrics_common::test_utils::series_fixtures;

    #[test]
    fn test_project_is_repeatable() {
        let raw = series_fixtures::two_week_ctr();
        let first = project(&raw, Frequency::Weekly).unwrap();
        let second = project(&raw, Frequency::Weekly).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.records.len(), 2);
        assert_eq!(first.series[names::CLICK_THROUGH_RATE].len(), 2);
    }

    #[test]
    fn test_project_empty() {
        let view = project(&[], Frequency::Monthly).unwrap();
        assert_eq!(view, DashboardView::empty(Frequency::Monthly));
        assert!(view.is_empty());
    }

    #[test]
    fn test_ctr_card_uses_range_sums() {
        let view = project(&series_fixtures::two_week_ctr(), Frequency::Weekly).unwrap();
        let ctr = view
            .cards
            .iter()
            .find(|c| c.metric == names::CLICK_THROUGH_RATE)
            .unwrap();
        assert_eq!(ctr.value, 50.0);
    }
}
