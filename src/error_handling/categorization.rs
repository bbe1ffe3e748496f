//! Fetch failure categorization.
//!
//! Maps `FetchError` and the `reqwest::Error` values inside it onto
//! `FetchErrorKind` so swallowed failures can still be counted and logged.

use super::stats::FetchStats;
use super::types::{FetchError, FetchErrorKind};

/// Categorizes a `reqwest::Error` into a `FetchErrorKind`.
///
/// Status codes are checked first, then the transport error class.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> FetchErrorKind {
    if let Some(status) = error.status() {
        return categorize_status(status.as_u16());
    }

    if error.is_builder() {
        FetchErrorKind::ClientBuild
    } else if error.is_redirect() {
        FetchErrorKind::Redirect
    } else if error.is_timeout() {
        FetchErrorKind::Timeout
    } else if error.is_connect() {
        FetchErrorKind::Connect
    } else if error.is_request() {
        FetchErrorKind::Request
    } else if error.is_body() {
        FetchErrorKind::Body
    } else if error.is_decode() {
        FetchErrorKind::Decode
    } else {
        FetchErrorKind::Other
    }
}

/// Categorizes a non-success HTTP status code.
pub fn categorize_status(status: u16) -> FetchErrorKind {
    match status {
        400..=499 => FetchErrorKind::HttpClientError,
        500..=599 => FetchErrorKind::HttpServerError,
        _ => FetchErrorKind::HttpOtherStatus,
    }
}

/// Categorizes any `FetchError`.
pub fn categorize_fetch_error(error: &FetchError) -> FetchErrorKind {
    match error {
        FetchError::InvalidUrl { .. } => FetchErrorKind::InvalidUrl,
        // Raised while resolving a label, before any fetch runs
        FetchError::UnknownEncoding(_) => FetchErrorKind::Other,
        FetchError::Client(_) => FetchErrorKind::ClientBuild,
        FetchError::Request { source, .. } => categorize_reqwest_error(source),
        FetchError::Status { status, .. } => categorize_status(*status),
        FetchError::Body { source, .. } => match categorize_reqwest_error(source) {
            FetchErrorKind::Other => FetchErrorKind::Body,
            kind => kind,
        },
        FetchError::Worker(_) => FetchErrorKind::Worker,
        FetchError::PoolClosed => FetchErrorKind::PoolClosed,
    }
}

/// Updates fetch statistics based on a `FetchError`.
///
/// Returns the category that was incremented so callers can log it.
pub fn update_fetch_stats(stats: &FetchStats, error: &FetchError) -> FetchErrorKind {
    let kind = categorize_fetch_error(error);
    stats.increment_failure(kind);
    kind
}
