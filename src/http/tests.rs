//! Tests for the HTTP client module

use super::*;
use crate::error::Error;
use crate::types::BackoffType;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .no_rate_limit()
        .build();
    HttpClient::with_config(config).unwrap()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
    assert!(config.base_url.is_none());
    assert!(config.rate_limit.is_none());
    assert!(config.user_agent.starts_with("cursor-pager/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.example.com")
        .timeout(Duration::from_secs(60))
        .max_retries(5)
        .backoff(
            BackoffType::Linear,
            Duration::from_millis(200),
            Duration::from_secs(30),
        )
        .rate_limit(RateLimiterConfig::new(5, 5))
        .header("X-Custom", "value")
        .build();

    assert_eq!(config.base_url, Some("https://api.example.com".to_string()));
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.backoff_type, BackoffType::Linear);
    assert_eq!(config.rate_limit, Some(RateLimiterConfig::new(5, 5)));
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
}

#[test]
fn test_request_config_keeps_query_order() {
    let config = RequestConfig::new()
        .query("pageSize", "20")
        .query("startAtDoc", "")
        .retries(2);

    assert_eq!(
        config.query,
        vec![
            ("pageSize".to_string(), "20".to_string()),
            ("startAtDoc".to_string(), String::new()),
        ]
    );
    assert_eq!(config.max_retries, Some(2));
}

#[tokio::test]
async fn test_get_with_query_and_default_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/issues-paginated"))
        .and(query_param("pageSize", "20"))
        .and(query_param("startAfterDoc", "id_19"))
        .and(header("X-Api-Key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "issuesPaginated": []
        })))
        .mount(&server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(format!("{}/api/", server.uri()))
        .header("X-Api-Key", "secret")
        .no_rate_limit()
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let response = client
        .get(
            "/issues-paginated",
            RequestConfig::new()
                .query("pageSize", "20")
                .query("startAfterDoc", "id_19"),
        )
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();

    assert!(body["issuesPaginated"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get("/missing", RequestConfig::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 404, ref body } if body == "Not found"));
}

#[tokio::test]
async fn test_retry_on_500_then_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .get("/flaky", RequestConfig::new())
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_retries_exhausted_wraps_last_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(3)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get("/down", RequestConfig::new().retries(2))
        .await
        .unwrap_err();

    match err {
        Error::MaxRetriesExceeded {
            max_retries,
            source,
        } => {
            assert_eq!(max_retries, 2);
            assert!(matches!(*source, Error::HttpStatus { status: 503, .. }));
        }
        other => panic!("expected MaxRetriesExceeded, got {other:?}"),
    }
}

#[tokio::test]
async fn test_no_retries_returns_status_directly() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get("/down", RequestConfig::new().retries(0))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
}

#[tokio::test]
async fn test_redirect_status_is_not_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cached"))
        .respond_with(ResponseTemplate::new(304))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get("/cached", RequestConfig::new().retries(2))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 304, .. }));
}

#[tokio::test]
async fn test_rate_limit_response_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .get("/limited", RequestConfig::new())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_rate_limit_without_retries_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get("/limited", RequestConfig::new().retries(0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after_seconds: 7
        }
    ));
}

#[tokio::test]
async fn test_absolute_url_bypasses_base() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/test"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = HttpClientConfig::builder().no_rate_limit().build();
    let client = HttpClient::with_config(config).unwrap();

    let response = client
        .get(&format!("{}/api/test", server.uri()), RequestConfig::new())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_rate_limited_client_still_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .rate_limit(RateLimiterConfig::new(100, 10))
        .build();
    let client = HttpClient::with_config(config).unwrap();
    assert!(client.has_rate_limiter());

    for _ in 0..3 {
        let response = client.get("/data", RequestConfig::new()).await.unwrap();
        assert_eq!(response.status(), 200);
    }
}

#[test]
fn test_calculate_backoff() {
    let build = |kind| {
        let config = HttpClientConfig::builder()
            .backoff(kind, Duration::from_millis(100), Duration::from_millis(500))
            .build();
        HttpClient::with_config(config).unwrap()
    };

    let constant = build(BackoffType::Constant);
    assert_eq!(constant.calculate_backoff(5), Duration::from_millis(100));

    let linear = build(BackoffType::Linear);
    assert_eq!(linear.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(linear.calculate_backoff(2), Duration::from_millis(300));

    let exponential = build(BackoffType::Exponential);
    assert_eq!(exponential.calculate_backoff(1), Duration::from_millis(200));
    assert_eq!(exponential.calculate_backoff(2), Duration::from_millis(400));
    // capped
    assert_eq!(exponential.calculate_backoff(10), Duration::from_millis(500));
}

#[test]
fn test_http_client_debug() {
    let client = HttpClient::with_config(HttpClientConfig::default()).unwrap();
    let debug_str = format!("{client:?}");
    assert!(debug_str.contains("HttpClient"));
    assert!(debug_str.contains("has_rate_limiter"));
}
