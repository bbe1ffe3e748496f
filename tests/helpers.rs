// Shared test helpers for fetch and request-context integration tests.
//
// Included by other test files with `mod helpers;`.

use std::net::SocketAddr;

use ambient_http::context::with_ambient_context;
use ambient_http::{initialization, Config, RemoteFetcher};
use axum::Router;

/// Creates a fetcher with a recognizable User-Agent and a small worker pool.
#[allow(dead_code)] // Used by other test files
pub fn test_fetcher() -> RemoteFetcher {
    let config = Config {
        user_agent: "ambient-http-test/1.0".to_string(),
        max_blocking_fetches: 4,
        ..Default::default()
    };
    RemoteFetcher::new(&config)
}

/// Runs a synchronous fetch on a blocking thread.
///
/// reqwest's blocking client refuses to run on an async worker thread, so sync
/// helpers are exercised from `spawn_blocking` inside tokio tests.
#[allow(dead_code)]
pub async fn run_sync<F>(f: F) -> String
where
    F: FnOnce() -> String + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("blocking fetch panicked")
}

/// Returns a loopback URL on a port nothing listens on.
#[allow(dead_code)]
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let addr = listener.local_addr().expect("probe listener address");
    drop(listener);
    format!("http://{}/unreachable", addr)
}

/// Serves `router` behind the context middleware on an ephemeral port.
#[allow(dead_code)]
pub async fn spawn_context_server(router: Router, config: &Config) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("test server address");
    let binding = initialization::init_context_binding(config, addr);
    let app = with_ambient_context(router, binding);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        {
            eprintln!("Test server error: {}", e);
        }
    });

    addr
}

/// Async client that reports redirects instead of following them.
#[allow(dead_code)]
pub fn non_following_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build test client")
}
