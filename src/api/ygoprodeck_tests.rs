//! Tests for the YGOPRODeck HTTP client.

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::HttpFetcher;
use crate::api::Fetcher;
use crate::cache::{Payload, PayloadKind};
use crate::error::LookupError;
use crate::request::RequestKey;

fn kuriboh_json() -> serde_json::Value {
    serde_json::json!({
        "data": [{
            "id": 40640057,
            "name": "Kuriboh",
            "type": "Effect Monster",
            "race": "Fiend",
            "attribute": "DARK"
        }]
    })
}

/// Runs the blocking fetcher off the async test runtime
async fn resolve(url: String, kind: PayloadKind) -> Result<Payload, LookupError> {
    tokio::task::spawn_blocking(move || {
        HttpFetcher::new().resolve(&RequestKey::from_url(url), kind)
    })
    .await
    .unwrap()
}

// ── structured ───────────────────────────────────────────────────────

#[tokio::test]
async fn resolve_structured_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardinfo.php"))
        .and(query_param("name", "Kuriboh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kuriboh_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/cardinfo.php?name=Kuriboh", mock_server.uri());
    let payload = resolve(url, PayloadKind::Structured).await.unwrap();

    assert_eq!(payload, Payload::Structured(kuriboh_json()));
}

#[tokio::test]
async fn resolve_encodes_spaces_in_filter_values() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardinfo.php"))
        .and(query_param("type", "Effect Monster"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kuriboh_json()))
        .mount(&mock_server)
        .await;

    let url = format!(
        "{}/cardinfo.php?name=Kuriboh&type=Effect Monster",
        mock_server.uri()
    );
    assert!(resolve(url, PayloadKind::Structured).await.is_ok());
}

#[tokio::test]
async fn resolve_sends_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("User-Agent", super::DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(kuriboh_json()))
        .mount(&mock_server)
        .await;

    let url = format!("{}/cardinfo.php?name=Kuriboh", mock_server.uri());
    assert!(resolve(url, PayloadKind::Structured).await.is_ok());
}

#[tokio::test]
async fn resolve_api_error_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cardinfo.php"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "No card matching your query was found in the database."
        })))
        .mount(&mock_server)
        .await;

    let url = format!("{}/cardinfo.php?name=Nope", mock_server.uri());
    match resolve(url, PayloadKind::Structured).await {
        Err(LookupError::ApiResponse { status, message }) => {
            assert_eq!(status.as_u16(), 400);
            assert!(message.contains("No card matching"));
        }
        other => panic!("Expected LookupError::ApiResponse, got: {other:?}"),
    }
}

#[tokio::test]
async fn resolve_invalid_json_is_fetch_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/cardinfo.php?name=Kuriboh", mock_server.uri());
    let err = resolve(url, PayloadKind::Structured).await.unwrap_err();
    assert!(err.is_fetch_error(), "got: {err:?}");
}

// ── binary ───────────────────────────────────────────────────────────

#[tokio::test]
async fn resolve_binary_success() {
    let mock_server = MockServer::start().await;
    let image = vec![0xFF, 0xD8, 0xFF, 0xE0];

    Mock::given(method("GET"))
        .and(path("/images/cards_small/40640057.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(image.clone()))
        .mount(&mock_server)
        .await;

    let url = format!("{}/images/cards_small/40640057.jpg", mock_server.uri());
    let payload = resolve(url, PayloadKind::Binary).await.unwrap();

    assert_eq!(payload, Payload::Binary(image));
}

#[tokio::test]
async fn resolve_binary_404_returns_http_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let url = format!("{}/images/cards/1.jpg", mock_server.uri());
    match resolve(url.clone(), PayloadKind::Binary).await {
        Err(LookupError::HttpStatus {
            url: failed,
            status,
        }) => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(failed, url);
        }
        other => panic!("Expected LookupError::HttpStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn resolve_network_error() {
    // Nothing listens on port 1
    let url = "http://127.0.0.1:1/cardinfo.php?name=Kuriboh".to_string();
    match resolve(url, PayloadKind::Structured).await {
        Err(LookupError::Network(_)) => {}
        other => panic!("Expected LookupError::Network, got: {other:?}"),
    }
}

// ── check_reachable ──────────────────────────────────────────────────

#[tokio::test]
async fn check_reachable_ok_and_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/up"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let base = mock_server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let fetcher = HttpFetcher::new();
        (
            fetcher.check_reachable(&format!("{base}/up")),
            fetcher.check_reachable(&format!("{base}/down")),
        )
    })
    .await
    .unwrap();

    assert!(result.0.is_ok());
    match result.1 {
        Err(LookupError::HttpStatus { status, .. }) => assert_eq!(status.as_u16(), 503),
        other => panic!("Expected LookupError::HttpStatus, got: {other:?}"),
    }
}
