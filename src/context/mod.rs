//! Ambient request context façade.
//!
//! `HttpContextFacade` gives any call site read access to the request being
//! served and a narrow write path (`redirect`, `write`) to its response, without
//! threading the request through every function signature.
//!
//! The façade is wired once with a `ContextProvider`:
//!
//! ```
//! use std::sync::Arc;
//! use ambient_http::context::{HttpContextFacade, TaskLocalProvider};
//!
//! static FACADE: HttpContextFacade = HttpContextFacade::new();
//!
//! FACADE.configure(Arc::new(TaskLocalProvider)).expect("configured once");
//! // Outside any request there is no context to read
//! assert!(FACADE.query_string().is_err());
//! ```
//!
//! Inside axum, the [`ambient_context`] middleware installs each request's
//! context for the task serving it.
//!
//! Every accessor returns `Result<_, ContextError>`. A missing `configure` call
//! or a call outside any request is a programming error and is never masked
//! with a default value.

mod middleware;
mod provider;
mod types;

use std::io::Cursor;
use std::net::IpAddr;
use std::sync::{Arc, OnceLock};

use axum::body::Bytes;

use crate::config::{HEADER_REQUEST_TYPE, HEADER_USER_AGENT};
use crate::error_handling::ContextError;

pub use middleware::{ambient_context, with_ambient_context, ContextBinding};
pub use provider::{scope, sync_scope, ContextProvider, TaskLocalProvider};
pub use types::{FormCollection, HttpContext, RequestState, ResponseState};

/// Read/write view over the ambient request context.
///
/// Configure exactly once during startup, then share freely (`Arc` or `static`).
pub struct HttpContextFacade {
    provider: OnceLock<Arc<dyn ContextProvider>>,
}

impl HttpContextFacade {
    /// Creates an unconfigured façade. Every accessor fails until `configure` is called.
    pub const fn new() -> Self {
        Self {
            provider: OnceLock::new(),
        }
    }

    /// Creates a façade already wired to `provider`.
    pub fn with_provider(provider: Arc<dyn ContextProvider>) -> Self {
        let facade = Self::new();
        // A fresh OnceLock cannot already be set
        let _ = facade.provider.set(provider);
        facade
    }

    /// Wires the provider. Call once, before any other method.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::AlreadyConfigured` on a second call; the first
    /// provider stays in place.
    pub fn configure(&self, provider: Arc<dyn ContextProvider>) -> Result<(), ContextError> {
        match self.provider.set(provider) {
            Ok(()) => {
                log::info!("Request context provider configured");
                Ok(())
            }
            Err(_) => {
                log::warn!("Ignoring second request context provider; the first stays active");
                Err(ContextError::AlreadyConfigured)
            }
        }
    }

    /// Whether `configure` has run.
    pub fn is_configured(&self) -> bool {
        self.provider.get().is_some()
    }

    /// The context of the request the calling flow is serving.
    ///
    /// # Errors
    ///
    /// - `NotConfigured` if `configure` was never called
    /// - `NoActiveContext` if the caller is not inside a request
    pub fn current(&self) -> Result<Arc<HttpContext>, ContextError> {
        let provider = self.provider.get().ok_or(ContextError::NotConfigured)?;
        provider.current().ok_or(ContextError::NoActiveContext)
    }

    /// Server address the request arrived on.
    pub fn local_ip_address(&self) -> Result<Option<IpAddr>, ContextError> {
        Ok(self.current()?.request().local_addr().map(|addr| addr.ip()))
    }

    /// Client address the request came from.
    pub fn remote_ip_address(&self) -> Result<Option<IpAddr>, ContextError> {
        Ok(self.current()?.request().remote_addr().map(|addr| addr.ip()))
    }

    /// Request header `name`, matched as given.
    pub fn header(&self, name: &str) -> Result<Option<String>, ContextError> {
        Ok(self.current()?.request().header(name))
    }

    /// The `UserAgent` request header.
    pub fn user_agent(&self) -> Result<Option<String>, ContextError> {
        self.header(HEADER_USER_AGENT)
    }

    /// The `RequestType` request header.
    pub fn request_type(&self) -> Result<Option<String>, ContextError> {
        self.header(HEADER_REQUEST_TYPE)
    }

    /// The request Content-Type header, if any.
    pub fn content_type(&self) -> Result<Option<String>, ContextError> {
        Ok(self.current()?.request().content_type())
    }

    /// Raw query string with its leading `?`, or `""`.
    pub fn query_string(&self) -> Result<String, ContextError> {
        Ok(self.current()?.request().query_string())
    }

    /// Urlencoded form fields of the request body.
    ///
    /// # Errors
    ///
    /// Besides the context errors, `IncorrectContentType` when the body is not a form.
    pub fn form(&self) -> Result<FormCollection, ContextError> {
        self.current()?.request().form()
    }

    /// Raw request body.
    pub fn body(&self) -> Result<Bytes, ContextError> {
        Ok(self.current()?.request().body().clone())
    }

    /// Raw request body as a reader positioned at the start.
    pub fn body_reader(&self) -> Result<Cursor<Bytes>, ContextError> {
        self.body().map(Cursor::new)
    }

    /// Redirects the current response to `url` with `302 Found`.
    pub fn redirect(&self, url: &str) -> Result<(), ContextError> {
        self.current()?.response().redirect(url)
    }

    /// Writes `text` to the current response body.
    ///
    /// Returns after the text is part of the response; failures are returned,
    /// never swallowed.
    pub fn write(&self, text: &str) -> Result<(), ContextError> {
        self.current()?.response().write(text)
    }
}

impl Default for HttpContextFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HttpContextFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpContextFacade")
            .field("configured", &self.is_configured())
            .finish()
    }
}
