//! HTTP header name constants.
//!
//! These names are looked up exactly as written. `UserAgent` is deliberately
//! not the standard `User-Agent` header.

/// Header read by `HttpContextFacade::user_agent`.
pub const HEADER_USER_AGENT: &str = "UserAgent";

/// Header read by `HttpContextFacade::request_type`.
pub const HEADER_REQUEST_TYPE: &str = "RequestType";

/// Separator used when a header carries several values.
pub const HEADER_VALUE_SEPARATOR: &str = ",";
