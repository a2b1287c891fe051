//! Test utilities and shared fixtures for botmetrics.
//!
//! Enabled for other crates through the `testing` feature.

use crate::{RawMetricSeries, RawPoint};
use chrono::{Duration, NaiveDate};
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call multiple times.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Assert that two floating point numbers are approximately equal within a tolerance.
pub fn assert_approx_eq(left: f64, right: f64, tolerance: f64) {
    let diff = (left - right).abs();
    assert!(
        diff <= tolerance,
        "assertion failed: `{left}` is not approximately equal to `{right}` (tolerance: {tolerance}, diff: {diff})"
    );
}

/// Calendar date shorthand for fixtures.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// Raw metric fixtures shaped like the backend's session export.
pub mod series_fixtures {
    use super::*;

    /// The two-week CTR scenario: 10/5 sessions on 2024-01-01, 20/10 on 2024-01-08.
    pub fn two_week_ctr() -> Vec<RawMetricSeries> {
        vec![
            RawMetricSeries::new(
                "Total unique sessions",
                [("2024-01-01", 10.0), ("2024-01-08", 20.0)],
            ),
            RawMetricSeries::new(
                "User consented sessions",
                [("2024-01-01", 5.0), ("2024-01-08", 10.0)],
            ),
        ]
    }

    /// One series with a point per day starting at `start`.
    pub fn daily_series(metric: &str, start: NaiveDate, values: &[f64]) -> RawMetricSeries {
        RawMetricSeries {
            metric: metric.to_string(),
            values: values
                .iter()
                .enumerate()
                .map(|(offset, value)| RawPoint {
                    period: (start + Duration::days(offset as i64)).format("%Y-%m-%d").to_string(),
                    value: Some(*value),
                })
                .collect(),
        }
    }

    /// A full session export covering every catalogued raw metric for `days` days.
    pub fn session_export(start: NaiveDate, days: usize) -> Vec<RawMetricSeries> {
        let ramp = |base: f64, step: f64| -> Vec<f64> {
            (0..days).map(|i| base + step * i as f64).collect()
        };
        vec![
            daily_series("Total unique sessions", start, &ramp(40.0, 3.0)),
            daily_series("User consented sessions", start, &ramp(12.0, 1.0)),
            daily_series("Active chat sessions", start, &ramp(6.0, 1.0)),
            daily_series("Total chat messages", start, &ramp(30.0, 4.0)),
            daily_series("Max messages in a chat session", start, &ramp(8.0, 0.5)),
            daily_series("Total engagement time (minutes)", start, &ramp(45.0, 5.0)),
            daily_series("Max session duration (minutes)", start, &ramp(14.0, 1.0)),
            daily_series("OTP logged in chat sessions", start, &ramp(2.0, 0.0)),
            daily_series("Manually logged out chat sessions", start, &ramp(1.0, 0.0)),
        ]
    }
}

/// Property-based testing strategies.
#[cfg(feature = "proptest")]
pub mod property_testing {
    use super::*;
    use proptest::prelude::*;

    /// Dates between 1990 and 2060, including leap days.
    pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (0i64..25_567).prop_map(|offset| date(1990, 1, 1) + Duration::days(offset))
    }

    /// Non-negative integral counts, the shape session counters have.
    pub fn count_strategy() -> impl Strategy<Value = f64> {
        (0u32..10_000).prop_map(f64::from)
    }

    /// A list of `(date, value)` observations.
    pub fn observations_strategy(max_len: usize) -> impl Strategy<Value = Vec<(NaiveDate, f64)>> {
        prop::collection::vec((date_strategy(), count_strategy()), 0..max_len)
    }
}
