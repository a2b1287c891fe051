//! Configuration loading: YAML file, then environment overrides, then validation.

use crate::schema::Config;
use crate::validator::ConfigValidator;
use botmetrics_common::{MetricsError, Result as MetricsResult};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_VAR: &str = "BOTMETRICS_CONFIG_PATH";

/// Files looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["botmetrics.yaml", "botmetrics.yml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// A field holds an unacceptable value
    #[error("Invalid configuration value for '{field}': {message}")]
    ValidationError {
        /// Dotted path of the offending field
        field: String,
        /// What is wrong with it
        message: String,
    },

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Variable name
        var: String,
        /// Parse failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for MetricsError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ValidationError { field, message } => {
                MetricsError::config(format!("invalid value for '{field}': {message}"))
            }
            other => MetricsError::config(other.to_string()),
        }
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        Self::load_config_with(path, |var| env::var(var).ok())
    }

    /// Like [`ConfigLoader::load_config`], reading overrides through `lookup`.
    pub fn load_config_with<P, F>(path: P, lookup: F) -> Result<Config, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::parse(&content)?;
        Self::apply_overrides(&mut config, lookup)?;
        ConfigValidator::validate(&config)?;
        debug!(path = %path.as_ref().display(), "Loaded configuration file");
        Ok(config)
    }

    /// Parses YAML; omitted sections and fields take their defaults.
    pub fn parse(content: &str) -> Result<Config, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load configuration from `BOTMETRICS_CONFIG_PATH`, a default file, or defaults alone.
    pub fn load() -> MetricsResult<Config> {
        let config = match Self::discover() {
            Some(path) => {
                info!(path = %path.display(), "Using configuration file");
                Self::load_config(&path)?
            }
            None => {
                info!("No configuration file found, using defaults");
                let mut config = Config::default();
                Self::apply_env_overrides(&mut config)?;
                ConfigValidator::validate(&config)?;
                config
            }
        };
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> MetricsResult<Config> {
        Ok(Self::load_config(path)?)
    }

    /// The file [`ConfigLoader::load`] would read, if any.
    pub fn discover() -> Option<PathBuf> {
        if let Ok(path) = env::var(CONFIG_PATH_VAR) {
            return Some(PathBuf::from(path));
        }
        DEFAULT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides(config, |var| env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Backend
        if let Some(url) = lookup("BOTMETRICS_BACKEND_URL") {
            config.backend.url = url;
        }
        if let Some(timeout) = lookup("BOTMETRICS_TIMEOUT") {
            config.backend.timeout_seconds = parse_var("BOTMETRICS_TIMEOUT", &timeout)?;
        }
        if let Some(retries) = lookup("BOTMETRICS_MAX_RETRIES") {
            config.backend.max_retries = parse_var("BOTMETRICS_MAX_RETRIES", &retries)?;
        }

        // Dashboard
        if let Some(bot_name) = lookup("BOTMETRICS_BOT_NAME") {
            config.dashboard.bot_name = bot_name;
        }
        if let Some(frequency) = lookup("BOTMETRICS_FREQUENCY") {
            config.dashboard.default_frequency = parse_var("BOTMETRICS_FREQUENCY", &frequency)?;
        }

        // Logging
        if let Some(level) = lookup("BOTMETRICS_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(())
    }
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e| ConfigError::EnvParseError {
        var: var.to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use botmetrics_common::Frequency;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Create a temporary YAML config file for testing
    fn create_test_config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes()).expect("Failed to write to temp file");
        file
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_load_valid_yaml_config() {
        let yaml = "backend:\n  url: \"https://metrics.example.com\"\n  timeout_seconds: 12\n  max_retries: 5\n  rate_limit_per_second: 4\n  max_idle_per_host: 2\ndashboard:\n  bot_name: \"SupportBot\"\n  default_frequency: monthly\n  offered_frequencies: [weekly, monthly]\n  default_range_days: 90\nlogging:\n  level: \"debug\"\n  format: compact\n  file_path: \"/var/log/botmetrics.log\"\n";

        let file = create_test_config_file(yaml);
        let config = ConfigLoader::load_config_with(file.path(), vars(&[])).expect("Failed to load config");

        assert_eq!(config.backend.url, "https://metrics.example.com");
        assert_eq!(config.backend.timeout().as_secs(), 12);
        assert_eq!(config.backend.max_retries, 5);
        assert_eq!(config.dashboard.bot_name, "SupportBot");
        assert_eq!(config.dashboard.default_frequency, Frequency::Monthly);
        assert_eq!(
            config.dashboard.offered_frequencies,
            vec![Frequency::Weekly, Frequency::Monthly]
        );
        assert_eq!(config.logging.file_path.as_deref(), Some("/var/log/botmetrics.log"));
    }

    #[test]
    fn test_load_minimal_config() {
        let file = create_test_config_file("dashboard:\n  bot_name: \"HelpBot\"\n");
        let config = ConfigLoader::load_config_with(file.path(), vars(&[])).expect("Failed to load config");

        assert_eq!(config.dashboard.bot_name, "HelpBot");
        assert_eq!(config.dashboard.default_frequency, Frequency::Weekly);
        assert_eq!(config.dashboard.offered_frequencies.len(), 5);
        assert_eq!(config.backend, crate::BackendConfig::default());
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let file = create_test_config_file("");
        let config = ConfigLoader::load_config_with(file.path(), vars(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_yaml() {
        let file = create_test_config_file("backend:\n  url: [unclosed array");
        let result = ConfigLoader::load_config_with(file.path(), vars(&[]));
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_unknown_frequency_in_yaml() {
        let file = create_test_config_file("dashboard:\n  default_frequency: hourly\n");
        let result = ConfigLoader::load_config_with(file.path(), vars(&[]));
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_validation_error() {
        let file = create_test_config_file("backend:\n  url: \"not_a_url\"\n");
        let result = ConfigLoader::load_config_with(file.path(), vars(&[]));
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError { ref field, .. } if field == "backend.url"
        ));
    }

    #[test]
    fn test_environment_variable_overrides() {
        let file = create_test_config_file("backend:\n  url: \"https://original.example.com\"\n");
        let overrides = vars(&[
            ("BOTMETRICS_BACKEND_URL", "https://env.example.com"),
            ("BOTMETRICS_TIMEOUT", "5"),
            ("BOTMETRICS_MAX_RETRIES", "1"),
            ("BOTMETRICS_BOT_NAME", "EnvBot"),
            ("BOTMETRICS_FREQUENCY", "quarterly"),
            ("BOTMETRICS_LOG_LEVEL", "debug"),
        ]);
        let config = ConfigLoader::load_config_with(file.path(), overrides).expect("Failed to load config");

        assert_eq!(config.backend.url, "https://env.example.com");
        assert_eq!(config.backend.timeout_seconds, 5);
        assert_eq!(config.backend.max_retries, 1);
        assert_eq!(config.dashboard.bot_name, "EnvBot");
        assert_eq!(config.dashboard.default_frequency, Frequency::Quarterly);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_env_parse_error() {
        let file = create_test_config_file("");
        let result = ConfigLoader::load_config_with(file.path(), vars(&[("BOTMETRICS_TIMEOUT", "soon")]));
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::EnvParseError { ref var, .. } if var == "BOTMETRICS_TIMEOUT"
        ));

        let result =
            ConfigLoader::load_config_with(file.path(), vars(&[("BOTMETRICS_FREQUENCY", "hourly")]));
        assert!(matches!(result.unwrap_err(), ConfigError::EnvParseError { .. }));
    }

    #[test]
    fn test_missing_config_file() {
        let result = ConfigLoader::load_config_with("/nonexistent/path/botmetrics.yaml", vars(&[]));
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_config_error_converts_to_metrics_error() {
        let err: MetricsError = ConfigError::ValidationError {
            field: "backend.url".to_string(),
            message: "bad".to_string(),
        }
        .into();
        assert_eq!(err.kind(), botmetrics_common::ErrorKind::Config);
        assert!(err.to_string().contains("backend.url"));
    }
}
