//! Request and response state carried by a `HttpContext`.

use std::net::SocketAddr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use axum::body::Bytes;
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{request, HeaderMap, HeaderValue, Method, StatusCode, Uri};

use crate::config::{FORM_URLENCODED_CONTENT_TYPE, HEADER_VALUE_SEPARATOR};
use crate::error_handling::ContextError;

/// The request/response pair for one inbound request.
#[derive(Debug)]
pub struct HttpContext {
    request: RequestState,
    response: ResponseState,
}

impl HttpContext {
    /// Wraps a request with a fresh, untouched response.
    pub fn new(request: RequestState) -> Self {
        Self {
            request,
            response: ResponseState::default(),
        }
    }

    /// Inbound request data.
    pub fn request(&self) -> &RequestState {
        &self.request
    }

    /// Outbound response being built by façade calls.
    pub fn response(&self) -> &ResponseState {
        &self.response
    }
}

/// Immutable snapshot of an inbound request with its body fully buffered.
#[derive(Debug, Clone)]
pub struct RequestState {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    local_addr: Option<SocketAddr>,
    remote_addr: Option<SocketAddr>,
}

impl RequestState {
    /// Builds request state from its pieces. Addresses start unset.
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            local_addr: None,
            remote_addr: None,
        }
    }

    /// Builds request state from `http` request parts and the buffered body.
    pub fn from_parts(parts: &request::Parts, body: Bytes) -> Self {
        Self::new(
            parts.method.clone(),
            parts.uri.clone(),
            parts.headers.clone(),
            body,
        )
    }

    /// Sets the server-side address the request arrived on.
    pub fn with_local_addr(mut self, addr: impl Into<Option<SocketAddr>>) -> Self {
        self.local_addr = addr.into();
        self
    }

    /// Sets the peer address the request came from.
    pub fn with_remote_addr(mut self, addr: impl Into<Option<SocketAddr>>) -> Self {
        self.remote_addr = addr.into();
        self
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request URI as received.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// All request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Buffered request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Address the server accepted the request on.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Address of the client.
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Value of header `name`, with repeated headers joined by `,`.
    ///
    /// The name is used exactly as given; there is no aliasing between spellings
    /// such as `UserAgent` and `User-Agent`. Names that are not valid header names
    /// simply match nothing.
    pub fn header(&self, name: &str) -> Option<String> {
        let values: Vec<String> = self
            .headers
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.join(HEADER_VALUE_SEPARATOR))
        }
    }

    /// The `Content-Type` header.
    pub fn content_type(&self) -> Option<String> {
        self.header(CONTENT_TYPE.as_str())
    }

    /// The raw query string including its leading `?`, or `""` when there is none.
    pub fn query_string(&self) -> String {
        match self.uri.query() {
            Some(query) if !query.is_empty() => format!("?{}", query),
            _ => String::new(),
        }
    }

    /// Parses the body as an urlencoded form.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::IncorrectContentType` unless the content type is
    /// `application/x-www-form-urlencoded`.
    pub fn form(&self) -> Result<FormCollection, ContextError> {
        let content_type = self.content_type();
        let is_form = content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(|essence| essence.trim().eq_ignore_ascii_case(FORM_URLENCODED_CONTENT_TYPE))
            .unwrap_or(false);
        if !is_form {
            return Err(ContextError::IncorrectContentType(content_type));
        }
        Ok(FormCollection::parse(&self.body))
    }
}

/// Form fields in submission order. Key lookup ignores case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormCollection {
    fields: Vec<(String, Vec<String>)>,
}

impl FormCollection {
    /// Parses an `application/x-www-form-urlencoded` payload.
    pub fn parse(body: &[u8]) -> Self {
        let mut collection = Self::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            collection.push(key.into_owned(), value.into_owned());
        }
        collection
    }

    fn push(&mut self, key: String, value: String) {
        match self.fields.iter_mut().find(|(k, _)| keys_match(k, &key)) {
            Some((_, values)) => values.push(value),
            None => self.fields.push((key, vec![value])),
        }
    }

    /// Value of `key`, with repeated fields joined by `,`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_all(key)
            .map(|values| values.join(HEADER_VALUE_SEPARATOR))
    }

    /// Every value submitted for `key`.
    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|(k, _)| keys_match(k, key))
            .map(|(_, values)| values.as_slice())
    }

    /// Whether the field was submitted.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get_all(key).is_some()
    }

    /// Field names in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Number of distinct fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields were submitted.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn keys_match(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Response state mutated through the façade.
///
/// Writing body text starts the response: status and headers are fixed from then
/// on. Once the hosting middleware completes the response, every mutation fails.
#[derive(Debug, Default)]
pub struct ResponseState {
    inner: Mutex<ResponseInner>,
}

#[derive(Debug)]
struct ResponseInner {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    touched: bool,
    started: bool,
    completed: bool,
}

impl Default for ResponseInner {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            touched: false,
            started: false,
            completed: false,
        }
    }
}

/// Final response produced by façade calls.
#[derive(Debug)]
pub(crate) struct CompletedResponse {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Vec<u8>,
}

impl ResponseState {
    fn lock(&self) -> MutexGuard<'_, ResponseInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets `302 Found` with a `Location` of `url`.
    ///
    /// # Errors
    ///
    /// - `ResponseCompleted` after the response was sent
    /// - `ResponseStarted` after body text was written
    /// - `InvalidHeaderValue` if `url` cannot be a header value
    pub fn redirect(&self, url: &str) -> Result<(), ContextError> {
        let location =
            HeaderValue::from_str(url).map_err(|_| ContextError::InvalidHeaderValue {
                name: "Location",
                value: url.to_string(),
            })?;

        let mut inner = self.lock();
        if inner.completed {
            return Err(ContextError::ResponseCompleted);
        }
        if inner.started {
            return Err(ContextError::ResponseStarted);
        }
        inner.status = StatusCode::FOUND;
        inner.headers.insert(LOCATION, location);
        inner.touched = true;
        Ok(())
    }

    /// Appends `text` to the body. Returns once the text is in the response.
    ///
    /// # Errors
    ///
    /// Returns `ResponseCompleted` after the response was sent.
    pub fn write(&self, text: &str) -> Result<(), ContextError> {
        let mut inner = self.lock();
        if inner.completed {
            return Err(ContextError::ResponseCompleted);
        }
        inner.body.extend_from_slice(text.as_bytes());
        inner.started = true;
        inner.touched = true;
        Ok(())
    }

    /// Status the response will be sent with.
    pub fn status(&self) -> StatusCode {
        self.lock().status
    }

    /// Value of response header `name`.
    pub fn header(&self, name: &str) -> Option<String> {
        self.lock()
            .headers
            .get(name)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
    }

    /// Copy of the body written so far.
    pub fn body(&self) -> Vec<u8> {
        self.lock().body.clone()
    }

    /// True once `redirect` or `write` has succeeded.
    pub fn is_touched(&self) -> bool {
        self.lock().touched
    }

    /// True once body text has been written.
    pub fn has_started(&self) -> bool {
        self.lock().started
    }

    /// Whether the response has been handed back to the server.
    pub fn is_completed(&self) -> bool {
        self.lock().completed
    }

    /// Marks the response completed and hands back the façade response, if any
    /// façade call touched it.
    pub(crate) fn complete(&self) -> Option<CompletedResponse> {
        let mut inner = self.lock();
        inner.completed = true;
        if !inner.touched {
            return None;
        }
        Some(CompletedResponse {
            status: inner.status,
            headers: std::mem::take(&mut inner.headers),
            body: std::mem::take(&mut inner.body),
        })
    }
}
