//! Configuration schema definitions.

use botmetrics_common::{DateRange, Frequency, LogFormat, LoggingConfig, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for botmetrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Metrics backend connection.
    pub backend: BackendConfig,
    /// Dashboard selection defaults.
    pub dashboard: DashboardConfig,
    /// Log output.
    pub logging: LoggingSettings,
}

/// Metrics backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL; the metrics endpoint lives at `{url}/api/metrics`.
    pub url: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Retries after the first attempt for transient failures.
    pub max_retries: u32,
    /// Upper bound on requests issued per second.
    pub rate_limit_per_second: u32,
    /// Idle pooled connections kept per host.
    pub max_idle_per_host: usize,
}

impl BackendConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Dashboard selection defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Bot whose metrics are fetched.
    pub bot_name: String,
    /// Frequency selected when none is given.
    pub default_frequency: Frequency,
    /// Frequencies a user may select.
    pub offered_frequencies: Vec<Frequency>,
    /// Length of the default date range, ending today.
    pub default_range_days: u32,
}

impl DashboardConfig {
    /// Whether `frequency` may be selected.
    pub fn offers(&self, frequency: Frequency) -> bool {
        self.offered_frequencies.contains(&frequency)
    }

    /// The default range ending on `today`.
    pub fn default_range(&self, today: NaiveDate) -> Result<DateRange> {
        DateRange::last_days(today, self.default_range_days)
    }
}

/// Logging settings as written in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `botmetrics_client=debug`.
    pub level: String,
    /// Output layout.
    pub format: LogFormat,
    /// Append logs to this file instead of stderr.
    pub file_path: Option<String>,
}

impl LoggingSettings {
    /// Settings in the shape the logging bootstrap expects.
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            format: self.format,
            file_path: self.file_path.clone(),
            ..LoggingConfig::default()
        }
    }
}
