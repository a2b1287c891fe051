//! Period key resolution: maps timestamps onto calendar buckets.

use botmetrics_common::Frequency;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, ParseError};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

/// Canonical string identifying one bucket, e.g. `2024-03-18`, `2024-03`, `2024-Q1`, `2024`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodKey(String);

impl PeriodKey {
    /// Wraps an already-formatted key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PeriodKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PeriodKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PeriodKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A calendar period: its first day plus the granularity it was bucketed at.
///
/// Ordering is chronological by start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    start: NaiveDate,
    frequency: Frequency,
}

impl Period {
    /// The period of `frequency` that contains `date`.
    pub fn containing(date: NaiveDate, frequency: Frequency) -> Self {
        let start = match frequency {
            Frequency::Daily => date,
            Frequency::Weekly => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            Frequency::Monthly => first_of_month(date),
            Frequency::Quarterly => {
                // step back to the first of the month, then over the months already
                // elapsed in the quarter
                let mut start = first_of_month(date);
                for _ in 0..date.month0() % 3 {
                    start = first_of_month(start - Duration::days(1));
                }
                start
            }
            Frequency::Yearly => date - Duration::days(i64::from(date.ordinal0())),
        };
        Self { start, frequency }
    }

    /// First calendar day of the period.
    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    /// Granularity this period was bucketed at.
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Quarter number, 1 through 4.
    pub fn quarter(&self) -> u32 {
        self.start.month0() / 3 + 1
    }

    /// Canonical key for this period.
    pub fn key(&self) -> PeriodKey {
        let key = match self.frequency {
            Frequency::Daily | Frequency::Weekly => self.start.format("%Y-%m-%d").to_string(),
            Frequency::Monthly => self.start.format("%Y-%m").to_string(),
            Frequency::Quarterly => format!("{}-Q{}", self.start.format("%Y"), self.quarter()),
            Frequency::Yearly => self.start.format("%Y").to_string(),
        };
        PeriodKey(key)
    }

    /// Parses a key produced at `frequency` back into a period.
    ///
    /// Returns `None` for text that is not a canonical key of that frequency,
    /// including weekly keys that do not fall on a Monday.
    pub fn from_key(key: &str, frequency: Frequency) -> Option<Self> {
        let start = match frequency {
            Frequency::Daily => parse_day(key)?,
            Frequency::Weekly => {
                let day = parse_day(key)?;
                if day.weekday().num_days_from_monday() != 0 {
                    return None;
                }
                day
            }
            Frequency::Monthly => {
                if key.len() != 7 {
                    return None;
                }
                NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d").ok()?
            }
            Frequency::Quarterly => {
                let (year, quarter) = key.split_once("-Q")?;
                let year: i32 = year.parse().ok()?;
                let quarter: u32 = quarter.parse().ok()?;
                if !(1..=4).contains(&quarter) {
                    return None;
                }
                NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1)?
            }
            Frequency::Yearly => {
                if key.len() != 4 {
                    return None;
                }
                NaiveDate::from_ymd_opt(key.parse().ok()?, 1, 1)?
            }
        };
        Some(Self { start, frequency })
    }

    /// Parses a key without knowing its frequency, inferring it from the key's shape.
    ///
    /// Daily and weekly keys share a format; both come back as daily periods,
    /// which order identically.
    pub fn infer_from_key(key: &str) -> Option<Self> {
        if key.contains("-Q") {
            Self::from_key(key, Frequency::Quarterly)
        } else {
            match key.len() {
                4 => Self::from_key(key, Frequency::Yearly),
                7 => Self::from_key(key, Frequency::Monthly),
                10 => Self::from_key(key, Frequency::Daily),
                _ => None,
            }
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn parse_day(key: &str) -> Option<NaiveDate> {
    if key.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Parses a raw point timestamp into the calendar date it represents.
///
/// Offset-bearing timestamps keep their own local date; nothing is converted to UTC.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDate, ParseError> {
    let raw = raw.trim();

    let offset_error = match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => return Ok(dt.date_naive()),
        Err(e) => e,
    };
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(dt.date_naive());
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.fZ",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(dt.date());
        }
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Ok(date),
        // a date-time shaped input reports the RFC 3339 failure, anything else the date failure
        Err(e) if raw.len() <= 10 => Err(e),
        Err(_) => Err(offset_error),
    }
}

/// Resolves the period containing `timestamp` at `frequency`.
pub fn resolve_period(timestamp: &str, frequency: Frequency) -> Result<Period, ParseError> {
    parse_timestamp(timestamp).map(|date| Period::containing(date, frequency))
}

/// Resolves the canonical key of the period containing `timestamp`.
pub fn resolve_period_key(timestamp: &str, frequency: Frequency) -> Result<PeriodKey, ParseError> {
    resolve_period(timestamp, frequency).map(|period| period.key())
}

/// Orders two period keys chronologically.
///
/// Keys that do not parse fall back to plain string order after all parseable keys.
pub fn compare_period_keys(a: &str, b: &str) -> Ordering {
    match (Period::infer_from_key(a), Period::infer_from_key(b)) {
        (Some(pa), Some(pb)) => pa
            .start_date()
            .cmp(&pb.start_date())
            .then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
