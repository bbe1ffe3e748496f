//! Outbound HTTP fetch helpers.
//!
//! `RemoteFetcher` issues GET and POST requests and returns the trimmed response
//! text. Two entry styles are offered:
//!
//! - **Legacy** (`fetch_get`, `fetch_post`, and their `_async` forms) return a
//!   `String` and map every failure to `""`. An empty body and an unreachable
//!   host look the same to the caller.
//! - **Detailed** (`try_fetch_get`, `try_fetch_post`, and their `_async` forms)
//!   return `Result<String, FetchError>`.
//!
//! Both styles release the connection handle before returning, count the outcome
//! in `FetchStats`, and log failures at debug level.
//!
//! The synchronous entry points block the calling thread and use reqwest's
//! blocking client, which panics when driven from an async executor thread. From
//! async code, call the `_async` variants; they run the same blocking call on the
//! bounded `BlockingPool` and await it.

mod connection;
mod encoding;
mod pool;

use std::sync::Arc;

use encoding_rs::{Encoding, UTF_8};
use reqwest::{Method, Url};

use crate::config::Config;
use crate::error_handling::{update_fetch_stats, FetchError, FetchStats};
use connection::{ConnectionHandle, HandleTracker};

pub use encoding::encoding_for_label;
pub use pool::BlockingPool;

/// GET/POST helper returning response text.
///
/// Cheap to clone; clones share the worker pool, statistics and handle count.
#[derive(Clone)]
pub struct RemoteFetcher {
    inner: Arc<FetcherInner>,
}

struct FetcherInner {
    user_agent: String,
    pool: BlockingPool,
    stats: FetchStats,
    handles: HandleTracker,
}

impl RemoteFetcher {
    /// Creates a fetcher with its own worker pool sized by `config.max_blocking_fetches`.
    pub fn new(config: &Config) -> Self {
        Self::with_pool(config, BlockingPool::new(config.max_blocking_fetches))
    }

    /// Creates a fetcher that submits async work to an existing pool.
    pub fn with_pool(config: &Config, pool: BlockingPool) -> Self {
        Self {
            inner: Arc::new(FetcherInner {
                user_agent: config.user_agent.clone(),
                pool,
                stats: FetchStats::new(),
                handles: HandleTracker::default(),
            }),
        }
    }

    /// Fetch outcome counters.
    pub fn stats(&self) -> &FetchStats {
        &self.inner.stats
    }

    /// Connection handles currently open. Zero whenever no fetch is in flight.
    pub fn open_handles(&self) -> usize {
        self.inner.handles.open_count()
    }

    /// Connection handles opened over the fetcher's lifetime.
    pub fn handles_opened(&self) -> usize {
        self.inner.handles.opened_total()
    }

    /// The worker pool backing the async variants.
    pub fn pool(&self) -> &BlockingPool {
        &self.inner.pool
    }

    /// GETs `url` and returns the UTF-8 body, trimmed, or `""` on any failure.
    pub fn fetch_get(&self, url: &str) -> String {
        self.fetch_get_with_encoding(url, UTF_8)
    }

    /// GETs `url` and returns the body decoded with `encoding`, trimmed, or `""`
    /// on any failure.
    pub fn fetch_get_with_encoding(&self, url: &str, encoding: &'static Encoding) -> String {
        self.try_fetch_get(url, encoding).unwrap_or_default()
    }

    /// GETs `url` and returns the body decoded with `encoding`, trimmed.
    ///
    /// # Errors
    ///
    /// Returns the `FetchError` describing why the fetch failed. Any non-success
    /// HTTP status is an error.
    pub fn try_fetch_get(
        &self,
        url: &str,
        encoding: &'static Encoding,
    ) -> Result<String, FetchError> {
        self.execute(Method::GET, url, None, encoding)
    }

    /// POSTs `data` as UTF-8 to `url` and returns the trimmed reply, or `""` on
    /// any failure.
    pub fn fetch_post(&self, url: &str, data: &str) -> String {
        self.try_fetch_post(url, data).unwrap_or_default()
    }

    /// POSTs `data` as UTF-8 with an explicit `Content-Length` and returns the
    /// reply decoded as UTF-8, trimmed.
    ///
    /// # Errors
    ///
    /// Returns the `FetchError` describing why the fetch failed.
    pub fn try_fetch_post(&self, url: &str, data: &str) -> Result<String, FetchError> {
        self.execute(Method::POST, url, Some(data.as_bytes().to_vec()), UTF_8)
    }

    /// Async form of [`fetch_get`](Self::fetch_get).
    pub async fn fetch_get_async(&self, url: &str) -> String {
        self.fetch_get_with_encoding_async(url, UTF_8).await
    }

    /// Async form of [`fetch_get_with_encoding`](Self::fetch_get_with_encoding).
    pub async fn fetch_get_with_encoding_async(
        &self,
        url: &str,
        encoding: &'static Encoding,
    ) -> String {
        self.try_fetch_get_async(url, encoding)
            .await
            .unwrap_or_default()
    }

    /// Async form of [`try_fetch_get`](Self::try_fetch_get).
    pub async fn try_fetch_get_async(
        &self,
        url: &str,
        encoding: &'static Encoding,
    ) -> Result<String, FetchError> {
        let fetcher = self.clone();
        let target = url.to_string();
        self.offload(url, move || fetcher.try_fetch_get(&target, encoding))
            .await
    }

    /// Async form of [`fetch_post`](Self::fetch_post).
    pub async fn fetch_post_async(&self, url: &str, data: &str) -> String {
        self.try_fetch_post_async(url, data)
            .await
            .unwrap_or_default()
    }

    /// Async form of [`try_fetch_post`](Self::try_fetch_post).
    pub async fn try_fetch_post_async(&self, url: &str, data: &str) -> Result<String, FetchError> {
        let fetcher = self.clone();
        let target = url.to_string();
        let payload = data.to_string();
        self.offload(url, move || fetcher.try_fetch_post(&target, &payload))
            .await
    }

    async fn offload<F>(&self, url: &str, job: F) -> Result<String, FetchError>
    where
        F: FnOnce() -> Result<String, FetchError> + Send + 'static,
    {
        match self.inner.pool.run(job).await {
            Ok(result) => result,
            // The job itself already recorded its outcome; only pool failures land here
            Err(e) => Err(self.record_failure(url, e)),
        }
    }

    fn execute(
        &self,
        method: Method,
        url: &str,
        payload: Option<Vec<u8>>,
        encoding: &'static Encoding,
    ) -> Result<String, FetchError> {
        match self.round_trip(method, url, payload, encoding) {
            Ok(text) => {
                self.inner.stats.record_success();
                Ok(text)
            }
            Err(e) => Err(self.record_failure(url, e)),
        }
    }

    fn round_trip(
        &self,
        method: Method,
        url: &str,
        payload: Option<Vec<u8>>,
        encoding: &'static Encoding,
    ) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        // The handle is dropped, and its client released, on every return below
        let handle = ConnectionHandle::open(
            &self.inner.handles,
            method,
            parsed,
            &self.inner.user_agent,
        )?;
        let response = handle.send(payload)?;
        let bytes = response.bytes().map_err(|source| FetchError::Body {
            url: handle.url().to_string(),
            source,
        })?;

        Ok(encoding::decode_trimmed(&bytes, encoding))
    }

    fn record_failure(&self, url: &str, error: FetchError) -> FetchError {
        let kind = update_fetch_stats(&self.inner.stats, &error);
        log::debug!("Fetch of {} failed ({}): {}", url, kind.as_str(), error);
        error
    }
}

impl std::fmt::Debug for RemoteFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteFetcher")
            .field("user_agent", &self.inner.user_agent)
            .field("pool_size", &self.inner.pool.size())
            .field("open_handles", &self.open_handles())
            .finish()
    }
}
