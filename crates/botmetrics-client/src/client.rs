//! Metrics backend client with connection pooling, rate limiting and retries
//!
//! Fetches raw per-timestamp metric series for one bot over a date range from
//! `GET {base_url}/api/metrics`.

use botmetrics_common::{DateRange, MetricsError, RawMetricSeries, Result};
use botmetrics_config::BackendConfig;
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, Response};
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::{debug, error, info, instrument, warn};

/// Path of the raw metrics endpoint below the base URL.
pub const METRICS_ENDPOINT: &str = "api/metrics";

/// Configuration for the metrics backend client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend (e.g., "http://127.0.0.1:8000")
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Connection pool max idle connections per host (default: 10)
    pub max_idle_per_host: usize,
    /// Rate limit: requests per second (default: 10)
    pub rate_limit_per_sec: u32,
    /// Retries after the first attempt (default: 3)
    pub max_retries: usize,
    /// First backoff delay in milliseconds; doubles per retry (default: 100)
    pub initial_backoff_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from(&BackendConfig::default())
    }
}

impl From<&BackendConfig> for ClientConfig {
    fn from(backend: &BackendConfig) -> Self {
        Self {
            base_url: backend.url.clone(),
            timeout_secs: backend.timeout_seconds,
            max_idle_per_host: backend.max_idle_per_host,
            rate_limit_per_sec: backend.rate_limit_per_second,
            max_retries: backend.max_retries as usize,
            initial_backoff_ms: 100,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration for `base_url` with default limits
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the rate limit
    pub fn with_rate_limit(mut self, rate_limit_per_sec: u32) -> Self {
        self.rate_limit_per_sec = rate_limit_per_sec;
        self
    }

    /// Set the maximum retry attempts
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the first backoff delay
    pub fn with_initial_backoff(mut self, initial_backoff_ms: u64) -> Self {
        self.initial_backoff_ms = initial_backoff_ms;
        self
    }
}

/// A failed attempt and whether repeating it could help.
struct AttemptError {
    error: MetricsError,
    transient: bool,
}

impl AttemptError {
    fn transient(error: MetricsError) -> Self {
        Self { error, transient: true }
    }

    fn permanent(error: MetricsError) -> Self {
        Self { error, transient: false }
    }
}

/// Metrics backend client
#[derive(Debug, Clone)]
pub struct MetricsClient {
    client: Client,
    config: ClientConfig,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl MetricsClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| MetricsError::network_with_source("Failed to create HTTP client", e))?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limit_per_sec)
                .ok_or_else(|| MetricsError::config("Rate limit must be greater than 0"))?,
        );
        let rate_limiter = Arc::new(DefaultDirectRateLimiter::direct(quota));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Create a client from the backend section of the config file
    pub fn from_backend_config(backend: &BackendConfig) -> Result<Self> {
        Self::new(ClientConfig::from(backend))
    }

    /// Client configuration in use
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn metrics_url(&self) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), METRICS_ENDPOINT)
    }

    /// Fetch raw metric series for `bot_name` over `range`.
    ///
    /// Timeouts, connection failures and 5xx answers are retried with exponential
    /// backoff; 4xx answers fail immediately.
    #[instrument(skip(self), fields(bot_name = %bot_name, range = %range))]
    pub async fn fetch_raw_metrics(
        &self,
        bot_name: &str,
        range: DateRange,
    ) -> Result<Vec<RawMetricSeries>> {
        let url = self.metrics_url();
        let start = range.start.format("%Y-%m-%d").to_string();
        let end = range.end.format("%Y-%m-%d").to_string();
        let query = [("bot_name", bot_name), ("start", start.as_str()), ("end", end.as_str())];

        let response = self.get_with_retry(&url, &query).await?;
        let series: Vec<RawMetricSeries> = Self::parse_response(response).await?;

        info!(
            "Fetched {} metric series ({} points) for {}",
            series.len(),
            series.iter().map(|s| s.values.len()).sum::<usize>(),
            bot_name
        );
        Ok(series)
    }

    async fn get_with_retry(&self, url: &str, query: &[(&str, &str)]) -> Result<Response> {
        let retry_strategy = ExponentialBackoff::from_millis(2)
            .factor((self.config.initial_backoff_ms / 2).max(1))
            .max_delay(Duration::from_secs(10))
            .take(self.config.max_retries);

        RetryIf::spawn(
            retry_strategy,
            move || async move {
                self.rate_limiter.until_ready().await;
                debug!("Requesting {}", url);
                self.send_once(url, query).await
            },
            |attempt: &AttemptError| {
                if attempt.transient {
                    warn!("Transient failure, will retry: {}", attempt.error);
                }
                attempt.transient
            },
        )
        .await
        .map_err(|attempt| attempt.error)
    }

    async fn send_once(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<Response, AttemptError> {
        match self.client.get(url).query(query).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    debug!("Request successful: {}", status);
                    Ok(response)
                } else if status.is_server_error() {
                    Err(AttemptError::transient(MetricsError::backend_with_status(
                        format!("Backend returned server error: {status}"),
                        status.as_u16(),
                    )))
                } else {
                    error!("Backend rejected request: {}", status);
                    Err(AttemptError::permanent(MetricsError::backend_with_status(
                        format!("Backend rejected request: {status}"),
                        status.as_u16(),
                    )))
                }
            }
            Err(e) if e.is_timeout() || e.is_connect() => {
                Err(AttemptError::transient(MetricsError::from(e)))
            }
            Err(e) => {
                error!("Request failed: {}", e);
                Err(AttemptError::permanent(MetricsError::from(e)))
            }
        }
    }

    async fn parse_response<T>(response: Response) -> Result<T>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let text = response
            .text()
            .await
            .map_err(|e| MetricsError::network_with_source("Failed to read response body", e))?;
        debug!("Response body: {} bytes", text.len());
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_backend_section() {
        let backend = BackendConfig {
            url: "https://metrics.example.com/".to_string(),
            timeout_seconds: 7,
            max_retries: 2,
            rate_limit_per_second: 3,
            max_idle_per_host: 4,
        };
        let config = ClientConfig::from(&backend);
        assert_eq!(config.timeout_secs, 7);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.rate_limit_per_sec, 3);
        assert_eq!(config.max_idle_per_host, 4);

        let client = MetricsClient::new(config).unwrap();
        assert_eq!(client.metrics_url(), "https://metrics.example.com/api/metrics");
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let err = MetricsClient::new(ClientConfig::new("http://localhost").with_rate_limit(0)).unwrap_err();
        assert_eq!(err.kind(), botmetrics_common::ErrorKind::Config);
    }
}
