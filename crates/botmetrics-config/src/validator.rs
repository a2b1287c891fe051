//! Configuration validation and frequency selection.

use crate::loader::ConfigError;
use crate::schema::{Config, DashboardConfig};
use botmetrics_common::{Frequency, MetricsError, Result};
use url::Url;

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Checks every field, reporting the first violation.
    pub fn validate(config: &Config) -> std::result::Result<(), ConfigError> {
        let backend = &config.backend;
        let url = Url::parse(&backend.url)
            .map_err(|e| invalid("backend.url", format!("'{}' is not a valid URL: {e}", backend.url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(
                "backend.url",
                format!("unsupported scheme '{}', expected http or https", url.scheme()),
            ));
        }
        if backend.timeout_seconds == 0 {
            return Err(invalid("backend.timeout_seconds", "must be greater than 0"));
        }
        if backend.rate_limit_per_second == 0 {
            return Err(invalid("backend.rate_limit_per_second", "must be greater than 0"));
        }

        let dashboard = &config.dashboard;
        if dashboard.bot_name.trim().is_empty() {
            return Err(invalid("dashboard.bot_name", "cannot be empty"));
        }
        if dashboard.offered_frequencies.is_empty() {
            return Err(invalid(
                "dashboard.offered_frequencies",
                "at least one frequency must be offered",
            ));
        }
        if !dashboard.offers(dashboard.default_frequency) {
            return Err(invalid(
                "dashboard.default_frequency",
                format!("'{}' is not among the offered frequencies", dashboard.default_frequency),
            ));
        }
        if dashboard.default_range_days == 0 {
            return Err(invalid("dashboard.default_range_days", "must be greater than 0"));
        }

        if config.logging.level.trim().is_empty() {
            return Err(invalid("logging.level", "cannot be empty"));
        }

        Ok(())
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

impl DashboardConfig {
    /// Resolves a user's frequency choice against the offered list.
    ///
    /// `None` selects the configured default. Unknown or non-offered values fail with
    /// [`MetricsError::UnsupportedFrequency`].
    pub fn resolve_frequency(&self, requested: Option<&str>) -> Result<Frequency> {
        let Some(requested) = requested else {
            return Ok(self.default_frequency);
        };
        let offered = || self.offered_frequencies.iter().map(|f| f.as_str());
        let frequency: Frequency = requested
            .parse()
            .map_err(|_| MetricsError::frequency_not_offered(requested, offered()))?;
        if !self.offers(frequency) {
            return Err(MetricsError::frequency_not_offered(requested, offered()));
        }
        Ok(frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botmetrics_common::ErrorKind;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ConfigValidator::validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_rejects_bad_backend_url() {
        let mut config = Config::default();
        config.backend.url = "not a url".to_string();
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref field, .. } if field == "backend.url"));

        config.backend.url = "ftp://metrics.local".to_string();
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_rejects_zero_values() {
        let mut config = Config::default();
        config.backend.timeout_seconds = 0;
        assert!(ConfigValidator::validate(&config).is_err());

        let mut config = Config::default();
        config.backend.rate_limit_per_second = 0;
        assert!(ConfigValidator::validate(&config).is_err());

        let mut config = Config::default();
        config.dashboard.default_range_days = 0;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_default_frequency_must_be_offered() {
        let mut config = Config::default();
        config.dashboard.offered_frequencies = vec![Frequency::Daily, Frequency::Monthly];
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("dashboard.default_frequency"));

        config.dashboard.offered_frequencies.clear();
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("dashboard.offered_frequencies"));
    }

    #[test]
    fn test_resolve_frequency() {
        let mut dashboard = DashboardConfig::default();
        assert_eq!(dashboard.resolve_frequency(None).unwrap(), Frequency::Weekly);
        assert_eq!(dashboard.resolve_frequency(Some("Monthly")).unwrap(), Frequency::Monthly);

        let err = dashboard.resolve_frequency(Some("hourly")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFrequency);

        dashboard.offered_frequencies = vec![Frequency::Weekly];
        match dashboard.resolve_frequency(Some("daily")).unwrap_err() {
            MetricsError::UnsupportedFrequency { value, offered } => {
                assert_eq!(value, "daily");
                assert_eq!(offered, vec!["weekly".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
