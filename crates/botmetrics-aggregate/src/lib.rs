//! # botmetrics aggregate
//!
//! Turns raw per-timestamp metric series into per-period records, range totals,
//! chart series and summary cards.
//!
//! ```
//! use botmetrics_aggregate::{names, project};
//! use botmetrics_common::{Frequency, RawMetricSeries};
//!
//! let raw = vec![
//!     RawMetricSeries::new(names::TOTAL_UNIQUE_SESSIONS, [("2024-01-01", 10.0)]),
//!     RawMetricSeries::new(names::USER_CONSENTED_SESSIONS, [("2024-01-03", 5.0)]),
//! ];
//! let view = project(&raw, Frequency::Weekly).unwrap();
//! assert_eq!(view.records[0].value(names::CLICK_THROUGH_RATE), Some(50.0));
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod classify;
pub mod dashboard;
pub mod engine;
pub mod names;
pub mod period;
pub mod record;
pub mod series;
pub mod summary;
pub mod totals;

pub use catalog::{CatalogEntry, MetricCatalog};
pub use classify::{ClassificationRule, MetricClassifier, MetricKind, MetricPattern, RatioDefinition};
pub use dashboard::{project, DashboardView};
pub use engine::{aggregate, AggregationEngine};
pub use period::{
    compare_period_keys, parse_timestamp, resolve_period, resolve_period_key, Period, PeriodKey,
};
pub use record::{sort_records, AggregatedRecord};
pub use series::{format_series, ChartPoint, ChartSeries};
pub use summary::{summary_cards, SummaryCard};
pub use totals::{totalize, totalize_all, MetricTotal};
