//! Per-call connection handles.
//!
//! Every fetch builds its own blocking client with idle pooling disabled and
//! wraps it in a `ConnectionHandle`. Dropping the handle releases the client and
//! its sockets, so the handle count returns to zero on every exit path.

use std::sync::atomic::{AtomicUsize, Ordering};

use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Method, Url};

use crate::error_handling::FetchError;

/// Counts connection handles that are currently open.
#[derive(Debug, Default)]
pub(crate) struct HandleTracker {
    open: AtomicUsize,
    opened_total: AtomicUsize,
}

impl HandleTracker {
    pub(crate) fn open_count(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub(crate) fn opened_total(&self) -> usize {
        self.opened_total.load(Ordering::SeqCst)
    }
}

/// An open request handle for a single GET or POST.
pub(crate) struct ConnectionHandle<'a> {
    client: Client,
    method: Method,
    url: Url,
    tracker: &'a HandleTracker,
}

impl<'a> ConnectionHandle<'a> {
    /// Builds the client for one request and registers the handle.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Client` if the client cannot be built. No handle is
    /// registered in that case.
    pub(crate) fn open(
        tracker: &'a HandleTracker,
        method: Method,
        url: Url,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(FetchError::Client)?;

        tracker.open.fetch_add(1, Ordering::SeqCst);
        tracker.opened_total.fetch_add(1, Ordering::SeqCst);
        log::trace!("Opened {} handle for {}", method, url);

        Ok(Self {
            client,
            method,
            url,
            tracker,
        })
    }

    /// Sends the request and checks the status.
    ///
    /// When `payload` is present it is written as the request body with an
    /// explicit `Content-Length`, including `Content-Length: 0` for an empty payload.
    pub(crate) fn send(&self, payload: Option<Vec<u8>>) -> Result<Response, FetchError> {
        let mut request = self.client.request(self.method.clone(), self.url.clone());
        if let Some(bytes) = payload {
            request = request.header(CONTENT_LENGTH, bytes.len()).body(bytes);
        }

        let response = request.send().map_err(|source| FetchError::Request {
            url: self.url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    pub(crate) fn url(&self) -> &Url {
        &self.url
    }
}

impl Drop for ConnectionHandle<'_> {
    fn drop(&mut self) {
        self.tracker.open.fetch_sub(1, Ordering::SeqCst);
        log::trace!("Released {} handle for {}", self.method, self.url);
    }
}
