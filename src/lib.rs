//! ambient_http library: request context access and outbound fetch helpers
//!
//! This library provides two independent pieces:
//!
//! - [`context`]: an ambient request context for axum applications. Any code
//!   running on behalf of a request can read its headers, query string, form and
//!   body, or redirect and write to its response, through a configured
//!   [`HttpContextFacade`].
//! - [`fetch`]: [`RemoteFetcher`], blocking GET/POST helpers with async wrappers
//!   that return the trimmed response text, or an empty string when anything goes
//!   wrong. `try_` variants return the underlying [`FetchError`] instead.
//!
//! # Example
//!
//! ```no_run
//! use std::net::SocketAddr;
//! use axum::{routing::post, Router};
//! use ambient_http::{initialization, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! initialization::init_logger(&config)?;
//!
//! let facade = initialization::init_facade();
//! let fetcher = initialization::init_fetcher(&config, initialization::init_worker_pool(&config));
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! let binding = initialization::init_context_binding(&config, listener.local_addr()?);
//!
//! let app = Router::new().route(
//!     "/notify",
//!     post(move || {
//!         let (facade, fetcher) = (facade.clone(), fetcher.clone());
//!         async move {
//!             let form = facade.form()?;
//!             let sign = form.get("sign").unwrap_or_default();
//!             let verdict = fetcher
//!                 .fetch_post_async("https://gateway.example/verify", &sign)
//!                 .await;
//!             facade.write(if verdict == "true" { "success" } else { "fail" })?;
//!             Ok::<_, ambient_http::ContextError>(())
//!         }
//!     }),
//! );
//! let app = ambient_http::context::with_ambient_context(app, binding);
//!
//! axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! The synchronous fetch helpers must not run on an async executor thread; use
//! the `_async` variants from async code. Those, and the context middleware,
//! require a Tokio runtime.

#![warn(missing_docs)]

pub mod config;
pub mod context;
pub mod error_handling;
pub mod fetch;
pub mod initialization;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use context::{ContextProvider, HttpContext, HttpContextFacade, TaskLocalProvider};
pub use encoding_rs::{Encoding, UTF_8};
pub use error_handling::{ContextError, FetchError, FetchErrorKind, FetchStats};
pub use fetch::{encoding_for_label, BlockingPool, RemoteFetcher};
