//! Configuration types.
//!
//! This module defines the library `Config` struct and the logging option enums
//! it carries.

use crate::config::constants::{
    DEFAULT_MAX_BLOCKING_FETCHES, DEFAULT_USER_AGENT, MAX_REQUEST_BODY_SIZE,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration.
///
/// Built programmatically; every field has a default.
///
/// # Examples
///
/// ```
/// use ambient_http::Config;
///
/// let config = Config {
///     max_blocking_fetches: 4,
///     ..Default::default()
/// };
/// assert_eq!(config.max_blocking_fetches, 4);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// User-Agent header sent on outbound fetches
    pub user_agent: String,

    /// Size of the worker pool backing the async fetch variants
    pub max_blocking_fetches: usize,

    /// Largest inbound request body the context middleware will buffer
    pub max_request_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_blocking_fetches: DEFAULT_MAX_BLOCKING_FETCHES,
            max_request_body_bytes: MAX_REQUEST_BODY_SIZE,
        }
    }
}
