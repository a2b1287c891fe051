//! Error types and utilities for botmetrics

use serde::Serialize;
use thiserror::Error;

/// Result type alias for botmetrics operations
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Coarse error classification handed to the calling layer for user-facing messaging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A frequency outside the recognized (or offered) options
    UnsupportedFrequency,
    /// A raw point that could not be bucketed
    MalformedInput,
    /// Invalid or unreadable configuration
    Config,
    /// Invalid caller-supplied parameters
    Validation,
    /// Transport failure talking to the backend
    Network,
    /// Backend answered with an error status
    Backend,
    /// JSON/YAML encoding or decoding failure
    Serialization,
    /// Filesystem failure
    Io,
}

/// Main error type for botmetrics operations
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Frequency value outside the recognized options
    #[error("Unsupported frequency: {value}")]
    UnsupportedFrequency {
        value: String,
        offered: Vec<String>,
    },

    /// A raw point's timestamp could not be parsed into a period
    #[error("Malformed input in metric '{metric}': cannot parse timestamp '{timestamp}'")]
    MalformedInput {
        metric: String,
        timestamp: String,
        #[source]
        source: Option<chrono::ParseError>,
    },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for caller input
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Network related errors (HTTP requests, etc.)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Metrics backend returned an error response
    #[error("Metrics backend error: {message}")]
    Backend {
        message: String,
        status_code: Option<u16>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MetricsError {
    /// Create an unsupported frequency error
    pub fn unsupported_frequency(value: impl Into<String>) -> Self {
        Self::UnsupportedFrequency {
            value: value.into(),
            offered: Vec::new(),
        }
    }

    /// Create an unsupported frequency error listing what is on offer
    pub fn frequency_not_offered<I, S>(value: impl Into<String>, offered: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::UnsupportedFrequency {
            value: value.into(),
            offered: offered.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a malformed input error for an unparseable timestamp
    pub fn malformed_input(metric: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self::MalformedInput {
            metric: metric.into(),
            timestamp: timestamp.into(),
            source: None,
        }
    }

    /// Create a malformed input error keeping the chrono parse failure
    pub fn malformed_input_with_source(
        metric: impl Into<String>,
        timestamp: impl Into<String>,
        source: chrono::ParseError,
    ) -> Self {
        Self::MalformedInput {
            metric: metric.into(),
            timestamp: timestamp.into(),
            source: Some(source),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new network error with source
    pub fn network_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new backend error with status code
    pub fn backend_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::Backend {
            message: msg.into(),
            status_code: Some(status),
        }
    }

    /// Classification used by callers to pick a message
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFrequency { .. } => ErrorKind::UnsupportedFrequency,
            Self::MalformedInput { .. } => ErrorKind::MalformedInput,
            Self::Config { .. } => ErrorKind::Config,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Network { .. } => ErrorKind::Network,
            Self::Backend { .. } => ErrorKind::Backend,
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether repeating the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Backend { status_code, .. } => status_code.map_or(true, |code| code >= 500),
            _ => false,
        }
    }
}

/// Convert from reqwest::Error to MetricsError
impl From<reqwest::Error> for MetricsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network_with_source("Request timeout", err)
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err)
        } else if err.is_decode() {
            Self::network_with_source("Failed to decode response body", err)
        } else {
            Self::network_with_source("Network request failed", err)
        }
    }
}

/// Convert from serde_yaml::Error to MetricsError
impl From<serde_yaml::Error> for MetricsError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::config_with_source("YAML parsing error", err)
    }
}
