//! External Fetcher Tests
//! Test File: fetcher_tests.rs
//!
//! Runs ExternalFetcher against a local wiremock MockServer.

use casefuse_engine::fetcher::{ExternalFetcher, FetchError, JSON_ACCEPT, TEXT_ACCEPT};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_AGENT: &str = "casefuse-test/0.1";

fn fetcher() -> ExternalFetcher {
    ExternalFetcher::new(TEST_AGENT, Duration::from_secs(2)).unwrap()
}

/// TC-FETCH-001: text fetch sends identifying headers and returns the body
#[tokio::test]
async fn tc_fetch_001_text_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("user-agent", TEST_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Order</h1>"))
        .expect(1)
        .mount(&server)
        .await;

    let body = fetcher()
        .fetch_text(&format!("{}/page", server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "<h1>Order</h1>");

    // Accept is a comma list, so compare the raw header
    let requests = server.received_requests().await.unwrap();
    let accept = requests[0].headers.get("accept").unwrap().to_str().unwrap();
    assert_eq!(accept, TEXT_ACCEPT);
}

/// TC-FETCH-002: JSON fetch re-serializes pretty
#[tokio::test]
async fn tc_fetch_002_json_pretty_printed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(header("accept", JSON_ACCEPT))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"case":"A-1","open":true}"#))
        .mount(&server)
        .await;

    let body = fetcher()
        .fetch_json(&format!("{}/api", server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "{\n  \"case\": \"A-1\",\n  \"open\": true\n}");
}

/// TC-FETCH-003: non-2xx status is an error carrying the status
#[tokio::test]
async fn tc_fetch_003_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/missing", server.uri());
    let result = fetcher().fetch_text(&url).await;

    assert_eq!(result, Err(FetchError::Status { url, status: 404 }));
}

/// TC-FETCH-004: malformed JSON is a parse error
#[tokio::test]
async fn tc_fetch_004_malformed_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = fetcher().fetch_json(&format!("{}/api", server.uri())).await;
    assert!(matches!(result, Err(FetchError::Parse { .. })));
}

/// TC-FETCH-005: slow server hits the timeout
#[tokio::test]
async fn tc_fetch_005_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let fetcher = ExternalFetcher::new(TEST_AGENT, Duration::from_millis(200)).unwrap();
    let result = fetcher.fetch_text(&server.uri()).await;
    assert!(matches!(result, Err(FetchError::Network { .. })));
}
