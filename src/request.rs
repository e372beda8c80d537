//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method, request::Parts};

use crate::context::Context;

/// An incoming HTTP request: head, fully-read body, route parameters and the
/// request's propagation [`Context`].
pub struct Request {
    pub(crate) parts: Parts,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) context: Context,
}

impl Request {
    /// Builds a request from an `http::Request` whose body is already in
    /// memory. It starts with no route parameters and an empty context.
    ///
    /// ```rust
    /// use seqlog::Request;
    ///
    /// let req = Request::from_http(
    ///     http::Request::builder()
    ///         .uri("/users/42")
    ///         .header("x-request-id", "r1")
    ///         .body(bytes::Bytes::new())
    ///         .unwrap(),
    /// );
    /// assert_eq!(req.header("X-Request-Id"), Some("r1"));
    /// ```
    pub fn from_http(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self { parts, body, params: HashMap::new(), context: Context::new() }
    }

    pub fn method(&self) -> &Method { &self.parts.method }
    pub fn path(&self) -> &str { self.parts.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.parts.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn context(&self) -> &Context { &self.context }

    /// Case-insensitive header lookup. Values that are not visible ASCII are
    /// reported as absent; use [`headers`](Request::headers) for raw bytes.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Replaces the request's context, typically with one derived from
    /// [`context`](Request::context).
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", self.method())
            .field("path", &self.path())
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
