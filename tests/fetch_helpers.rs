//! Integration tests for the remote fetch helpers.
//!
//! These tests verify, against a wiremock server:
//! - Response text is trimmed and decoded with the selected encoding
//! - Every failure maps to "" on the legacy path and to a FetchError on the detailed path
//! - Connection handles are released on success and failure alike
//! - Sync and async variants agree

mod helpers;

use ambient_http::{encoding_for_label, FetchError, FetchErrorKind, UTF_8};
use helpers::{run_sync, test_fetcher, unreachable_url};
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Whitespace around the body is stripped.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fetch_get_trims_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hello"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  hello  \r\n"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let url = format!("{}/hello", server.uri());
    let sync_fetcher = fetcher.clone();
    let text = run_sync(move || sync_fetcher.fetch_get(&url)).await;

    assert_eq!(text, "hello");
    assert_eq!(fetcher.open_handles(), 0);
    assert_eq!(fetcher.stats().successes(), 1);
}

/// Whitespace-only and empty bodies both normalize to "".
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_whitespace_only_body_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blank"))
        .respond_with(ResponseTemplate::new(200).set_body_string(" \n\t "))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let result = fetcher
        .try_fetch_get_async(&format!("{}/blank", server.uri()), UTF_8)
        .await;

    // A blank body is a success with empty text, not an error
    assert_eq!(result.expect("blank body is not an error"), "");
    assert_eq!(fetcher.stats().total_failures(), 0);
}

/// An unreachable host yields "" and leaves no handle open.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unreachable_host_returns_empty_without_leaking() {
    let fetcher = test_fetcher();
    let url = unreachable_url().await;

    let sync_fetcher = fetcher.clone();
    let sync_url = url.clone();
    let text = run_sync(move || sync_fetcher.fetch_get(&sync_url)).await;
    assert_eq!(text, "");
    assert_eq!(fetcher.open_handles(), 0);
    assert_eq!(fetcher.handles_opened(), 1);

    let detailed = fetcher.try_fetch_get_async(&url, UTF_8).await;
    assert!(
        matches!(detailed, Err(FetchError::Request { .. })),
        "expected request error, got {:?}",
        detailed
    );
    assert_eq!(fetcher.open_handles(), 0);
    assert_eq!(fetcher.stats().get_failure_count(FetchErrorKind::Connect), 2);
}

/// Non-success statuses are failures even when they carry a body.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_error_status_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let url = format!("{}/broken", server.uri());

    assert_eq!(fetcher.fetch_get_async(&url).await, "");
    let detailed = fetcher.try_fetch_get_async(&url, UTF_8).await;
    assert!(matches!(
        detailed,
        Err(FetchError::Status { status: 500, .. })
    ));
    assert_eq!(
        fetcher
            .stats()
            .get_failure_count(FetchErrorKind::HttpServerError),
        2
    );
    assert_eq!(fetcher.open_handles(), 0);
}

/// An empty POST still sends Content-Length: 0 and returns the reply.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fetch_post_empty_payload_sends_zero_length() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .and(header("content-length", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\n accepted \n"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let url = format!("{}/submit", server.uri());
    let sync_fetcher = fetcher.clone();
    let text = run_sync(move || sync_fetcher.fetch_post(&url, "")).await;

    assert_eq!(text, "accepted");
}

/// The POST body is the UTF-8 encoding of the data with a matching Content-Length.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fetch_post_sends_utf8_payload() {
    let payload = "out_trade_no=订单-42&total=9.90";
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notify"))
        .and(body_string(payload))
        .and(header(
            "content-length",
            payload.len().to_string().as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string("success"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let text = fetcher
        .fetch_post_async(&format!("{}/notify", server.uri()), payload)
        .await;
    assert_eq!(text, "success");
}

/// Posting a payload to an echo endpoint returns the original payload.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_post_echo_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .respond_with(|req: &wiremock::Request| {
            ResponseTemplate::new(200).set_body_bytes(req.body.clone())
        })
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let url = format!("{}/echo", server.uri());
    for payload in ["plain", "{\"amount\":100,\"currency\":\"CNY\"}", "ünïcödé ✓"] {
        assert_eq!(fetcher.fetch_post_async(&url, payload).await, payload);
    }
    assert_eq!(fetcher.stats().successes(), 3);
}

/// Sync and async GET return the same text for the same server state.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_sync_and_async_get_agree() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stable"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  same answer\n"))
        .expect(2)
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let url = format!("{}/stable", server.uri());

    let sync_fetcher = fetcher.clone();
    let sync_url = url.clone();
    let sync_text = run_sync(move || sync_fetcher.fetch_get(&sync_url)).await;
    let async_text = fetcher.fetch_get_async(&url).await;

    assert_eq!(sync_text, async_text);
    assert_eq!(async_text, "same answer");
}

/// A non-UTF-8 body decodes correctly when its encoding is selected.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fetch_get_with_selected_encoding() {
    // "支付成功" (payment succeeded) in GBK
    let gbk_body: Vec<u8> = vec![0xD6, 0xA7, 0xB8, 0xB6, 0xB3, 0xC9, 0xB9, 0xA6];
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gbk"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gbk_body))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let gbk = encoding_for_label("gbk").expect("gbk is a known label");
    let text = fetcher
        .fetch_get_with_encoding_async(&format!("{}/gbk", server.uri()), gbk)
        .await;
    assert_eq!(text, "支付成功");

    // Decoding the same bytes as UTF-8 does not fail; it yields replacement characters
    let utf8_text = fetcher
        .fetch_get_async(&format!("{}/gbk", server.uri()))
        .await;
    assert_ne!(utf8_text, "支付成功");
    assert!(utf8_text.contains('\u{FFFD}'));
}

/// The configured User-Agent is sent on every request.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_configured_user_agent_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "ambient-http-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    assert_eq!(fetcher.fetch_get_async(&server.uri()).await, "ok");
}

/// Concurrent async fetches are independent and each releases its handle.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_async_fetches_are_independent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(|req: &wiremock::Request| {
            ResponseTemplate::new(200).set_body_string(format!(" {} ", req.url.path()))
        })
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let requests = (0..16).map(|i| {
        let fetcher = fetcher.clone();
        let url = format!("{}/item/{}", server.uri(), i);
        async move { (i, fetcher.fetch_get_async(&url).await) }
    });

    for (i, text) in futures::future::join_all(requests).await {
        assert_eq!(text, format!("/item/{}", i));
    }
    assert_eq!(fetcher.open_handles(), 0);
    assert_eq!(fetcher.handles_opened(), 16);
    assert_eq!(fetcher.stats().successes(), 16);
}
