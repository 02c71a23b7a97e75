use std::time::Duration;

use scrape_engine::{FailureKind, FetchSettings, Fetcher, ReqwestFetcher, RequestKind};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(settings: FetchSettings) -> ReqwestFetcher {
    ReqwestFetcher::new(settings).expect("client builds")
}

fn test_settings() -> FetchSettings {
    FetchSettings {
        user_agent: "scrape-test/1.0".to_string(),
        ..FetchSettings::default()
    }
}

#[tokio::test]
async fn page_fetch_sends_browser_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc"))
        .and(header("user-agent", "scrape-test/1.0"))
        .and(header_exists("accept"))
        .and(header_exists("accept-language"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>ok</html>", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let url = format!("{}/doc", server.uri());
    let output = fetcher(test_settings())
        .fetch(&url, RequestKind::Page)
        .await
        .expect("fetch ok");

    assert_eq!(output.metadata.original_url, url);
    assert_eq!(output.metadata.final_url, url);
    assert_eq!(output.metadata.byte_len, 15);
    assert!(output
        .metadata
        .content_type
        .unwrap()
        .starts_with("text/html"));
    assert_eq!(output.bytes, b"<html>ok</html>");
}

#[tokio::test]
async fn asset_fetch_sends_only_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']))
        .mount(&server)
        .await;

    let url = format!("{}/a.png", server.uri());
    let output = fetcher(test_settings())
        .fetch(&url, RequestKind::Asset)
        .await
        .expect("fetch ok");
    assert_eq!(output.bytes, vec![0x89, b'P', b'N', b'G']);

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].headers.get("user-agent").unwrap(),
        "scrape-test/1.0"
    );
    assert!(requests[0].headers.get("accept-language").is_none());
}

#[tokio::test]
async fn not_found_is_an_http_status_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/missing", server.uri());
    let err = fetcher(test_settings())
        .fetch(&url, RequestKind::Asset)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn only_status_200_counts_as_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let url = format!("{}/empty", server.uri());
    let err = fetcher(test_settings())
        .fetch(&url, RequestKind::Page)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(204));
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        asset_timeout: Duration::from_millis(50),
        ..test_settings()
    };
    let url = format!("{}/slow", server.uri());
    let err = fetcher(settings)
        .fetch(&url, RequestKind::Asset)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(ResponseTemplate::new(200).set_body_string("01234567890"))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..test_settings()
    };
    let url = format!("{}/large", server.uri());
    let err = fetcher(settings)
        .fetch(&url, RequestKind::Asset)
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn malformed_url_fails_without_network() {
    let err = fetcher(test_settings())
        .fetch("not a url", RequestKind::Page)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
