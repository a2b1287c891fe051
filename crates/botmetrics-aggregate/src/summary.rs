//! Summary cards: one headline number per metric with its catalog remark.

use crate::classify::MetricKind;
use crate::engine::AggregationEngine;
use crate::record::AggregatedRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryCard {
    pub metric: String,
    pub kind: MetricKind,
    pub value: f64,
    /// Empty for metrics the catalog does not know
    pub description: String,
}

impl AggregationEngine {
    /// Cards for every metric present, catalogued metrics first.
    pub fn summary_cards(&self, records: &[AggregatedRecord]) -> Vec<SummaryCard> {
        self.totalize_all(records)
            .into_iter()
            .map(|total| SummaryCard {
                description: self
                    .catalog()
                    .describe(&total.metric)
                    .unwrap_or_default()
                    .to_string(),
                metric: total.metric,
                kind: total.kind,
                value: total.value,
            })
            .collect()
    }
}

/// Summary cards with the default engine.
pub fn summary_cards(records: &[AggregatedRecord]) -> Vec<SummaryCard> {
    AggregationEngine::new().summary_cards(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names;
    use crate::period::PeriodKey;

    #[test]
    fn test_cards_carry_descriptions() {
        let mut record = AggregatedRecord::new(PeriodKey::from("2024-01-01"));
        record.metrics.insert(names::TOTAL_UNIQUE_SESSIONS.to_string(), 12.0);
        record.metrics.insert("Bounces".to_string(), 2.0);

        let cards = summary_cards(&[record]);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].metric, names::TOTAL_UNIQUE_SESSIONS);
        assert_eq!(cards[0].value, 12.0);
        assert!(cards[0].description.contains("unique sessions"));
        assert_eq!(cards[1].metric, "Bounces");
        assert!(cards[1].description.is_empty());
    }
}
