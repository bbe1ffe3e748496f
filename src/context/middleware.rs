//! axum middleware that installs the request context.
//!
//! For every request the middleware buffers the body, builds a `HttpContext`,
//! hands an identical request to the inner service, and runs that service inside
//! the task-local scope read by `TaskLocalProvider`. Afterwards it completes the
//! façade response; if a handler called `redirect` or `write`, that response
//! replaces whatever the handler returned, unless the handler answered with an
//! error status.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::{from_fn_with_state, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;

use super::provider::scope;
use super::types::{CompletedResponse, HttpContext, RequestState};
use crate::config::Config;
use crate::error_handling::ContextError;

/// Per-server settings for [`ambient_context`].
#[derive(Debug, Clone)]
pub struct ContextBinding {
    local_addr: Option<SocketAddr>,
    max_body_bytes: usize,
}

impl ContextBinding {
    /// Binding using the body limit from `config` and no known local address.
    pub fn new(config: &Config) -> Self {
        Self {
            local_addr: None,
            max_body_bytes: config.max_request_body_bytes,
        }
    }

    /// Records the address the server listens on, usually `listener.local_addr()`.
    pub fn with_local_addr(mut self, addr: SocketAddr) -> Self {
        self.local_addr = Some(addr);
        self
    }

    /// Address reported by `local_ip_address`.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Largest request body buffered for the context.
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }
}

/// Adds [`ambient_context`] to every route of `router`.
pub fn with_ambient_context<S>(router: Router<S>, binding: ContextBinding) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(from_fn_with_state(binding, ambient_context))
}

/// Middleware installing the per-request `HttpContext`.
///
/// The remote address comes from `ConnectInfo<SocketAddr>`, so serve with
/// `into_make_service_with_connect_info::<SocketAddr>()` to populate it.
pub async fn ambient_context(
    State(binding): State<ContextBinding>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    let declared_length = parts
        .headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if declared_length.is_some_and(|len| len > binding.max_body_bytes) {
        log::debug!(
            "Rejecting {} {}: declared body exceeds {} bytes",
            parts.method,
            parts.uri,
            binding.max_body_bytes
        );
        return StatusCode::PAYLOAD_TOO_LARGE.into_response();
    }

    let bytes = match axum::body::to_bytes(body, binding.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            log::debug!(
                "Failed to buffer body of {} {}: {}",
                parts.method,
                parts.uri,
                e
            );
            return (StatusCode::BAD_REQUEST, "Failed to read request body").into_response();
        }
    };

    let remote_addr = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let request_state = RequestState::from_parts(&parts, bytes.clone())
        .with_local_addr(binding.local_addr)
        .with_remote_addr(remote_addr);
    let context = Arc::new(HttpContext::new(request_state));

    log::trace!("Installed request context for {} {}", parts.method, parts.uri);
    let request = Request::from_parts(parts, Body::from(bytes));
    let response = scope(Arc::clone(&context), next.run(request)).await;

    let completed = context.response().complete();
    select_response(response, completed)
}

/// Picks the response sent to the client. A touched façade response wins
/// unless the handler itself failed.
fn select_response(handler: Response, completed: Option<CompletedResponse>) -> Response {
    let status = handler.status();
    match completed {
        Some(_) if status.is_client_error() || status.is_server_error() => {
            log::debug!(
                "Handler failed with {}; discarding façade response",
                status
            );
            handler
        }
        Some(completed) => facade_response(completed),
        None => handler,
    }
}

/// Lets handlers use `?` on façade calls. Misuse of the façade is a server bug,
/// so everything except a non-form body maps to 500.
impl IntoResponse for ContextError {
    fn into_response(self) -> Response {
        let status = match self {
            ContextError::IncorrectContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            log::error!("Request context error: {}", self);
        } else {
            log::debug!("Request context error: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}

fn facade_response(completed: CompletedResponse) -> Response {
    let CompletedResponse {
        status,
        mut headers,
        body,
    } = completed;
    if !body.is_empty() && !headers.contains_key(CONTENT_TYPE) {
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
    }

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
