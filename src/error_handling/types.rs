//! Error type definitions.
//!
//! This module defines the error enums for the request context façade, the
//! fetch helpers and initialization, plus the failure categories tracked by
//! `FetchStats`.

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Errors raised by the request context façade.
///
/// These are programming errors (missing `configure` call, accessor used outside
/// a request) and are always returned to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// `configure()` was never called on the façade.
    #[error("Context provider not configured. Call configure() first")]
    NotConfigured,

    /// `configure()` was called a second time.
    #[error("Context provider already configured")]
    AlreadyConfigured,

    /// The provider has no context for the calling task.
    #[error("No request context is active for the current task")]
    NoActiveContext,

    /// The request body is not a form submission.
    #[error("Incorrect Content-Type: {}", content_type_label(.0))]
    IncorrectContentType(Option<String>),

    /// Body text was already written, so status and headers are fixed.
    #[error("Response has already started; status and headers can no longer change")]
    ResponseStarted,

    /// The response was already sent; it can no longer be modified.
    #[error("Response has already completed")]
    ResponseCompleted,

    /// A header value supplied to `redirect` could not be encoded.
    #[error("Invalid value for header {name}: {value}")]
    InvalidHeaderValue {
        /// Header being set
        name: &'static str,
        /// Rejected value
        value: String,
    },
}

fn content_type_label(content_type: &Option<String>) -> &str {
    content_type.as_deref().unwrap_or("none")
}

/// Errors raised by the detailed (`try_`) fetch helpers.
///
/// The legacy helpers map every variant to an empty string.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The URL could not be parsed.
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        /// URL as given by the caller
        url: String,
        /// Parse failure
        #[source]
        source: url::ParseError,
    },

    /// No text encoding matches the requested label.
    #[error("Unknown text encoding: {0}")]
    UnknownEncoding(String),

    /// The per-call HTTP client could not be built.
    #[error("HTTP client construction failed: {0}")]
    Client(#[source] reqwest::Error),

    /// Connecting, sending, or receiving headers failed.
    #[error("Request to {url} failed: {source}")]
    Request {
        /// Target URL
        url: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Target URL
        url: String,
        /// Status code returned
        status: u16,
    },

    /// Reading the response body failed.
    #[error("Failed to read response body from {url}: {source}")]
    Body {
        /// Target URL
        url: String,
        /// Underlying read error
        #[source]
        source: reqwest::Error,
    },

    /// The worker running the blocking call panicked or was aborted.
    #[error("Fetch worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    /// The worker pool semaphore was closed.
    #[error("Fetch worker pool is closed")]
    PoolClosed,
}

/// Failure categories counted by `FetchStats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FetchErrorKind {
    /// The URL could not be parsed.
    InvalidUrl,
    /// The per-call client could not be built.
    ClientBuild,
    // Transport errors
    /// The request timed out.
    Timeout,
    /// The connection could not be established.
    Connect,
    /// Following a redirect failed.
    Redirect,
    /// Sending the request failed.
    Request,
    /// Reading the response body failed.
    Body,
    /// The response could not be decoded.
    Decode,
    // Status errors
    /// A 4xx status.
    HttpClientError,
    /// A 5xx status.
    HttpServerError,
    /// Any other non-success status.
    HttpOtherStatus,
    // Worker pool
    /// The blocking worker panicked or was aborted.
    Worker,
    /// The worker pool was closed.
    PoolClosed,
    /// Anything not covered above.
    Other,
}

impl FetchErrorKind {
    /// Short label used in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchErrorKind::InvalidUrl => "invalid URL",
            FetchErrorKind::ClientBuild => "client build error",
            FetchErrorKind::Timeout => "timeout",
            FetchErrorKind::Connect => "connection error",
            FetchErrorKind::Redirect => "redirect error",
            FetchErrorKind::Request => "request error",
            FetchErrorKind::Body => "body error",
            FetchErrorKind::Decode => "decode error",
            FetchErrorKind::HttpClientError => "HTTP 4xx",
            FetchErrorKind::HttpServerError => "HTTP 5xx",
            FetchErrorKind::HttpOtherStatus => "HTTP non-success status",
            FetchErrorKind::Worker => "worker failure",
            FetchErrorKind::PoolClosed => "worker pool closed",
            FetchErrorKind::Other => "other error",
        }
    }
}
