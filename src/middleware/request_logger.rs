//! Per-request, order-indexed logging.
//!
//! For every request, [`RequestLogging`]:
//!
//! 1. builds a [`SequencedLogger`] with [`RequestLoggerFactory`], carrying
//!    `session_id`, `test_id` and `request_id` taken from the request headers;
//! 2. installs it into the request's [`Context`];
//! 3. runs the rest of the chain;
//! 4. writes one `end-of-request` record at `INFO`.
//!
//! Handlers fetch the logger once with [`request_logger`] and reuse it:
//!
//! ```rust
//! use seqlog::{Attr, Request, Response, request_logger};
//!
//! async fn get_user(req: Request) -> Response {
//!     if let Some(log) = request_logger(&req) {
//!         log.info("loading user", &[Attr::new("id", req.param("id").unwrap_or(""))]);
//!     }
//!     Response::text("ok")
//! }
//! ```
//!
//! Step 4 runs when the handler's future completes. A handler that panics,
//! or a request whose future is dropped mid-flight, gets no trailer record.

use std::sync::Arc;

use http::HeaderName;

use crate::context::Context;
use crate::logger::{Attr, FieldNormalizer, JsonLogger, SequencedLogger, Sink};
use crate::request::Request;

use super::{BoxFuture, Middleware, Next};

/// Message of the record written after every request.
pub const TRAILER_MESSAGE: &str = "end-of-request";

// ── Correlation headers ───────────────────────────────────────────────────────

/// Headers the correlation identifiers are read from.
#[derive(Clone, Debug)]
pub struct CorrelationHeaders {
    pub session_id: HeaderName,
    pub test_id: HeaderName,
    pub request_id: HeaderName,
}

impl Default for CorrelationHeaders {
    fn default() -> Self {
        Self {
            session_id: HeaderName::from_static("x-session-id"),
            test_id: HeaderName::from_static("x-test-id"),
            request_id: HeaderName::from_static("x-request-id"),
        }
    }
}

// ── Factory ───────────────────────────────────────────────────────────────────

/// Builds one [`SequencedLogger`] per request.
#[derive(Clone, Debug)]
pub struct RequestLoggerFactory {
    sink: Sink,
    headers: CorrelationHeaders,
}

impl RequestLoggerFactory {
    pub fn new(sink: Sink) -> Self {
        Self { sink, headers: CorrelationHeaders::default() }
    }

    pub fn stdout() -> Self {
        Self::new(Sink::stdout())
    }

    pub fn with_headers(mut self, headers: CorrelationHeaders) -> Self {
        self.headers = headers;
        self
    }

    /// A fresh logger for `req`: counter at 0, records normalized, and the
    /// three correlation fields attached. A missing header yields `""`.
    pub fn build(&self, req: &Request) -> SequencedLogger {
        let header = |name: &HeaderName| {
            req.headers()
                .get(name)
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .unwrap_or_default()
        };

        let logger = JsonLogger::new(self.sink.clone())
            .with_transform(FieldNormalizer)
            .with([
                Attr::new("session_id", header(&self.headers.session_id)),
                Attr::new("test_id", header(&self.headers.test_id)),
                Attr::new("request_id", header(&self.headers.request_id)),
            ]);

        SequencedLogger::new(logger)
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Binding slot for the request logger. Private, so only this module can
/// read or write it.
#[derive(Clone)]
struct LoggerBinding(Arc<SequencedLogger>);

/// Returns a context derived from `ctx` carrying `logger`. An outer binding
/// is shadowed, not merged.
pub fn install(ctx: &Context, logger: Arc<SequencedLogger>) -> Context {
    ctx.with_value(LoggerBinding(logger))
}

/// The logger bound in `ctx`, or `None` if there is none.
pub fn retrieve(ctx: &Context) -> Option<Arc<SequencedLogger>> {
    ctx.value::<LoggerBinding>().map(|b| Arc::clone(&b.0))
}

/// The logger [`RequestLogging`] installed for `req`, or `None` when the
/// request did not pass through it. Callers decide the fallback.
pub fn request_logger(req: &Request) -> Option<Arc<SequencedLogger>> {
    retrieve(req.context())
}

// ── Middleware ────────────────────────────────────────────────────────────────

/// The request-logging middleware.
///
/// ```rust,no_run
/// use seqlog::{RequestLogging, Router, Server};
///
/// # async fn run() -> Result<(), seqlog::Error> {
/// let app = Router::new().layer(RequestLogging::new());
/// Server::bind("0.0.0.0:3000").serve(app).await
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct RequestLogging {
    factory: RequestLoggerFactory,
}

impl RequestLogging {
    /// Logs to stdout, reading the default correlation headers.
    pub fn new() -> Self {
        Self::with_factory(RequestLoggerFactory::stdout())
    }

    pub fn with_factory(factory: RequestLoggerFactory) -> Self {
        Self { factory }
    }
}

impl Default for RequestLogging {
    fn default() -> Self { Self::new() }
}

impl Middleware for RequestLogging {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let logger = Arc::new(self.factory.build(&req));
        let ctx = install(req.context(), Arc::clone(&logger));
        let req = req.with_context(ctx);

        Box::pin(async move {
            let res = next.run(req).await;
            logger.info(TRAILER_MESSAGE, &[]);
            res
        })
    }
}
