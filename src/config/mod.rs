//! Library configuration and constants.
//!
//! This module provides:
//! - Configuration constants (default user agent, pool and body size limits)
//! - HTTP header name constants used by the request context accessors
//! - The `Config` struct and logging option types

mod constants;
mod headers;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::*;
pub use types::{Config, LogFormat, LogLevel};
