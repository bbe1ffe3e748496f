//! Error handling and fetch statistics.
//!
//! This module provides:
//! - Error type definitions for the context façade, fetch helpers and initialization
//! - Failure categorization from `reqwest` errors and HTTP status codes
//! - Thread-safe fetch statistics
//!
//! Two policies coexist: `ContextError` always reaches the caller, while
//! `FetchError` only reaches callers of the `try_` fetch helpers.

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{
    categorize_fetch_error, categorize_reqwest_error, categorize_status, update_fetch_stats,
};
pub use stats::FetchStats;
pub use types::{ContextError, FetchError, FetchErrorKind, InitializationError};
