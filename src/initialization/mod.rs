//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources a host
//! application wires at startup:
//! - Logger
//! - Worker pool for async fetches
//! - Remote fetcher
//! - Request context façade and middleware binding

mod logger;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Config;
use crate::context::{ContextBinding, HttpContextFacade, TaskLocalProvider};
use crate::error_handling::InitializationError;
use crate::fetch::{BlockingPool, RemoteFetcher};

// Re-export public API
pub use logger::init_logger_with;

/// Initializes the logger from `config.log_level` and `config.log_format`.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger(config: &Config) -> Result<(), InitializationError> {
    init_logger_with(config.log_level.into(), config.log_format)
}

/// Initializes the bounded pool used by the async fetch variants.
///
/// # Arguments
///
/// * `config` - `max_blocking_fetches` sets the number of concurrent blocking calls
pub fn init_worker_pool(config: &Config) -> BlockingPool {
    BlockingPool::new(config.max_blocking_fetches)
}

/// Initializes a fetcher sharing `pool`.
pub fn init_fetcher(config: &Config, pool: BlockingPool) -> RemoteFetcher {
    log::debug!(
        "Remote fetcher ready (user agent {:?}, {} workers)",
        config.user_agent,
        pool.size()
    );
    RemoteFetcher::with_pool(config, pool)
}

/// Initializes a façade configured with the task-local provider installed by
/// the `ambient_context` middleware.
pub fn init_facade() -> Arc<HttpContextFacade> {
    Arc::new(HttpContextFacade::with_provider(Arc::new(TaskLocalProvider)))
}

/// Initializes the middleware binding for a server listening on `local_addr`.
pub fn init_context_binding(config: &Config, local_addr: SocketAddr) -> ContextBinding {
    ContextBinding::new(config).with_local_addr(local_addr)
}
