//! Integration tests for the metrics backend client against a mock server.

use botmetrics_client::{ClientConfig, MetricsClient};
use botmetrics_common::test_utils::date;
use botmetrics_common::{DateRange, ErrorKind, MetricsError};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn range() -> DateRange {
    DateRange::new(date(2024, 1, 1), date(2024, 1, 14)).unwrap()
}

fn client_for(server: &MockServer, max_retries: usize) -> MetricsClient {
    let config = ClientConfig::new(server.uri())
        .with_max_retries(max_retries)
        .with_initial_backoff(10);
    MetricsClient::new(config).unwrap()
}

fn sample_body() -> serde_json::Value {
    json!([
        {
            "metric": "Total unique sessions",
            "values": [
                { "period": "2024-01-01", "value": 10.0 },
                { "period": "2024-01-08", "value": 20.0 }
            ]
        },
        {
            "metric": "User consented sessions",
            "values": [
                { "period": "2024-01-01", "value": 5.0 },
                { "period": "2024-01-08" }
            ]
        }
    ])
}

#[tokio::test]
async fn test_fetch_sends_bot_and_range() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .and(query_param("bot_name", "HAiBot"))
        .and(query_param("start", "2024-01-01"))
        .and(query_param("end", "2024-01-14"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 0);
    let series = client.fetch_raw_metrics("HAiBot", range()).await.unwrap();

    assert_eq!(series.len(), 2);
    assert_eq!(series[0].metric, "Total unique sessions");
    assert_eq!(series[0].values[1].value, Some(20.0));
    assert_eq!(series[1].values[1].value, None);
}

#[tokio::test]
async fn test_retry_on_503_succeeds() {
    let mock_server = MockServer::start().await;

    // Fail twice with 503, then succeed
    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 3);
    let series = client.fetch_raw_metrics("HAiBot", range()).await.unwrap();
    assert_eq!(series.len(), 2);
}

#[tokio::test]
async fn test_server_errors_exhaust_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 2);
    let err = client.fetch_raw_metrics("HAiBot", range()).await.unwrap_err();
    assert!(matches!(err, MetricsError::Backend { status_code: Some(500), .. }));
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"detail":"unknown bot"}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 3);
    let err = client.fetch_raw_metrics("NoSuchBot", range()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Backend);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_timeout_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(sample_body())
                .set_delay(std::time::Duration::from_millis(1500)),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
        .mount(&mock_server)
        .await;

    let config = ClientConfig::new(mock_server.uri())
        .with_timeout(1)
        .with_max_retries(1)
        .with_initial_backoff(10);
    let client = MetricsClient::new(config).unwrap();
    assert!(client.fetch_raw_metrics("HAiBot", range()).await.is_ok());
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 0);
    let err = client.fetch_raw_metrics("HAiBot", range()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialization);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let config = ClientConfig::new("http://127.0.0.1:1")
        .with_max_retries(1)
        .with_initial_backoff(10);
    let client = MetricsClient::new(config).unwrap();
    let err = client.fetch_raw_metrics("HAiBot", range()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}
