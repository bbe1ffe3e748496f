//! Configuration constants.
//!
//! Defaults shared by the fetch helpers and the request context middleware.

/// Default User-Agent string for outbound fetches.
///
/// Sent on every GET/POST issued by `RemoteFetcher` unless `Config::user_agent`
/// overrides it.
pub const DEFAULT_USER_AGENT: &str = concat!("ambient_http/", env!("CARGO_PKG_VERSION"));

/// Maximum number of blocking fetches running at once on behalf of the async
/// variants. Further calls wait for a permit.
pub const DEFAULT_MAX_BLOCKING_FETCHES: usize = 32;

/// Maximum inbound request body size in bytes (2MB).
/// The context middleware rejects larger bodies with 413 before the handler runs.
pub const MAX_REQUEST_BODY_SIZE: usize = 2 * 1024 * 1024;

/// MIME type the form accessor accepts.
pub const FORM_URLENCODED_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
