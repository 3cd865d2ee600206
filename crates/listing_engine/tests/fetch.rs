use std::time::Duration;

use listing_engine::{FailureKind, FetchSettings, ReqwestTransport, Transport};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetch_returns_decoded_html() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"<html>caf\xe9</html>".to_vec(), "text/html; charset=ISO-8859-1"),
        )
        .mount(&server)
        .await;

    let mut transport = ReqwestTransport::new(FetchSettings::default()).unwrap();
    let url = format!("{}/jobs", server.uri());

    let page = transport.fetch(&url).await.expect("fetch ok");
    assert_eq!(page.url, url);
    assert_eq!(page.html, "<html>caf\u{e9}</html>");
}

#[tokio::test]
async fn fetch_sends_browser_like_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(header("upgrade-insecure-requests", "1"))
        .and(header("sec-fetch-mode", "navigate"))
        .and(header_exists("user-agent"))
        .and(header_exists("accept-language"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut transport = ReqwestTransport::new(FetchSettings::default()).unwrap();
    transport
        .fetch(&format!("{}/jobs", server.uri()))
        .await
        .expect("headers matched");
}

#[tokio::test]
async fn non_200_status_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let mut transport = ReqwestTransport::new(FetchSettings::default()).unwrap();

    let err = transport
        .fetch(&format!("{}/blocked", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(403));

    let err = transport
        .fetch(&format!("{}/empty", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(204));
}

#[tokio::test]
async fn failure_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let mut transport = ReqwestTransport::new(FetchSettings::default()).unwrap();
    let err = transport
        .fetch(&format!("{}/flaky", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
}

#[tokio::test]
async fn redirects_report_the_final_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>moved</p>"))
        .mount(&server)
        .await;

    let mut transport = ReqwestTransport::new(FetchSettings::default()).unwrap();
    let page = transport
        .fetch(&format!("{}/old", server.uri()))
        .await
        .unwrap();
    assert_eq!(page.url, format!("{}/new", server.uri()));
    assert_eq!(page.html, "<p>moved</p>");
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
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let mut transport = ReqwestTransport::new(settings).unwrap();

    let err = transport
        .fetch(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn too_large_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html")
                .set_body_string("01234567890"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let mut transport = ReqwestTransport::new(settings).unwrap();

    let err = transport
        .fetch(&format!("{}/large", server.uri()))
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
async fn invalid_and_unreachable_urls_fail() {
    let mut transport = ReqwestTransport::new(FetchSettings::default()).unwrap();

    let err = transport.fetch("not a url").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);

    // Nothing listens on port 1.
    let err = transport.fetch("http://127.0.0.1:1/jobs").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Network);
}

#[tokio::test]
async fn closed_transport_refuses_to_fetch() {
    let server = MockServer::start().await;
    let mut transport = ReqwestTransport::new(FetchSettings::default()).unwrap();
    transport.close().await.unwrap();

    let err = transport.fetch(&server.uri()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Network);
    assert!(err.message.contains("closed"));
    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}
