//! Wire types shared between the fetch collaborator and the aggregation core.

use crate::error::{MetricsError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single measurement at an absolute instant, not yet bucketed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    /// Timestamp as delivered by the backend (RFC 3339, naive date-time or bare date).
    pub period: String,
    /// Measured value; `None` counts as zero.
    #[serde(default)]
    pub value: Option<f64>,
}

impl RawPoint {
    /// Creates a point with a present value.
    pub fn new(period: impl Into<String>, value: f64) -> Self {
        Self {
            period: period.into(),
            value: Some(value),
        }
    }

    /// Value with missing measurements treated as zero.
    pub fn value_or_zero(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }
}

/// One named metric as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMetricSeries {
    /// Metric name, e.g. `"Total unique sessions"`.
    pub metric: String,
    /// Points in backend order.
    #[serde(default)]
    pub values: Vec<RawPoint>,
}

impl RawMetricSeries {
    /// Creates a series from `(timestamp, value)` pairs.
    pub fn new<I, S>(metric: impl Into<String>, points: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            metric: metric.into(),
            values: points
                .into_iter()
                .map(|(period, value)| RawPoint::new(period, value))
                .collect(),
        }
    }
}

/// Calendar bucketing granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// One bucket per calendar day
    Daily,
    /// Monday-start weeks
    #[default]
    Weekly,
    /// Calendar months
    Monthly,
    /// Calendar quarters
    Quarterly,
    /// Calendar years
    Yearly,
}

impl Frequency {
    /// All recognized frequencies, finest first.
    pub const ALL: [Frequency; 5] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::Yearly,
    ];

    /// Lowercase identifier used in config files and query strings.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        }
    }

    /// Human-readable label for selectors.
    pub const fn display_name(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::Yearly => "Yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Frequency::Daily),
            "weekly" | "week" => Ok(Frequency::Weekly),
            "monthly" | "month" => Ok(Frequency::Monthly),
            "quarterly" | "quarter" => Ok(Frequency::Quarterly),
            "yearly" | "year" | "annual" => Ok(Frequency::Yearly),
            _ => Err(MetricsError::unsupported_frequency(s)),
        }
    }
}

/// Inclusive calendar date range used to scope a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First day included
    pub start: NaiveDate,
    /// Last day included
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(MetricsError::validation_field(
                format!("start date {start} is after end date {end}"),
                "range",
            ));
        }
        Ok(Self { start, end })
    }

    /// The `days`-long range ending on `end` (inclusive).
    pub fn last_days(end: NaiveDate, days: u32) -> Result<Self> {
        let span = chrono::Duration::days(i64::from(days.saturating_sub(1)));
        let start = end
            .checked_sub_signed(span)
            .ok_or_else(|| MetricsError::validation_field("range start out of bounds", "range"))?;
        Self::new(start, end)
    }

    /// Parses `YYYY-MM-DD` endpoints.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let parse = |value: &str, field: &str| {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
                MetricsError::validation_field(format!("invalid date '{value}', expected YYYY-MM-DD"), field)
            })
        };
        Self::new(parse(start, "start")?, parse(end, "end")?)
    }

    /// Number of calendar days covered.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Whether a date falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start.format("%Y-%m-%d"), self.end.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_parsing() {
        assert_eq!("weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!(" Quarterly ".parse::<Frequency>().unwrap(), Frequency::Quarterly);
        assert_eq!("year".parse::<Frequency>().unwrap(), Frequency::Yearly);

        let err = "fortnightly".parse::<Frequency>().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::UnsupportedFrequency);
    }

    #[test]
    fn test_frequency_serde_roundtrip_names() {
        let json = serde_json::to_string(&Frequency::Monthly).unwrap();
        assert_eq!(json, "\"monthly\"");
        let parsed: Frequency = serde_json::from_str("\"daily\"").unwrap();
        assert_eq!(parsed, Frequency::Daily);
    }

    #[test]
    fn test_raw_series_deserialize_missing_value() {
        let json = r#"{"metric":"Total unique sessions","values":[{"period":"2024-01-01"},{"period":"2024-01-02","value":null},{"period":"2024-01-03","value":4}]}"#;
        let series: RawMetricSeries = serde_json::from_str(json).unwrap();
        assert_eq!(series.values.len(), 3);
        assert_eq!(series.values[0].value_or_zero(), 0.0);
        assert_eq!(series.values[1].value_or_zero(), 0.0);
        assert_eq!(series.values[2].value_or_zero(), 4.0);
    }

    #[test]
    fn test_date_range_validation() {
        let start = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let range = DateRange::new(start, end).unwrap();
        assert_eq!(range.num_days(), 62);
        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()));

        assert!(DateRange::new(end, start).is_err());
        assert!(DateRange::parse("2024-02-30", "2024-03-01").is_err());
    }

    #[test]
    fn test_last_days() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let range = DateRange::last_days(end, 30).unwrap();
        assert_eq!(range.num_days(), 30);
        // leap year: Feb 2024 has 29 days
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }
}
