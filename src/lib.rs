//! # seqlog
//!
//! Request-scoped structured logging for hyper services, with a sequence
//! number on every line.
//!
//! ## What it does
//!
//! Wrap a [`Router`] in [`RequestLogging`] and every request gets its own
//! [`SequencedLogger`]:
//!
//! - **Ordered:** each record carries an `order_index` from a request-local
//!   counter, so lines written concurrently by one request can be put back in
//!   call order downstream.
//! - **Correlated:** `session_id`, `test_id` and `request_id` are read from
//!   `X-Session-Id`, `X-Test-Id` and `X-Request-Id` and attached to every line.
//! - **Normalized:** records use `severity`, `message` and a UTC RFC 3339
//!   nanosecond `time`, whatever the call site.
//! - **Bracketed:** one `end-of-request` record closes every request.
//!
//! ```text
//! {"time":"2026-10-18T09:12:03.048213775Z","severity":"INFO","message":"loading user",
//!  "session_id":"s1","test_id":"","request_id":"r1","id":"42","order_index":0}
//! ```
//!
//! Log storage, shipping, querying and level filtering are someone else's
//! job. seqlog writes JSON lines to one text sink and stops there.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use seqlog::{Attr, Request, RequestLogging, Response, Router, Server, request_logger};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .get("/users/{id}", get_user)
//!         .layer(RequestLogging::new());
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown").to_owned();
//!     if let Some(log) = request_logger(&req) {
//!         log.info("loading user", &[Attr::new("id", id.as_str())]);
//!     }
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//! ```

mod context;
mod error;
mod handler;
mod logger;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;

pub use context::Context;
pub use error::Error;
pub use handler::Handler;
pub use logger::{
    Attr, AttrValue, FieldNormalizer, FieldTransform, JsonLogger, LEVEL_KEY, MESSAGE_KEY,
    MemoryWriter, NORMALIZED_MESSAGE_KEY, ORDER_INDEX_KEY, SEVERITY_KEY, SequencedLogger, Sink,
    TIME_KEY,
};
pub use middleware::{
    CorrelationHeaders, RequestLoggerFactory, RequestLogging, TRAILER_MESSAGE, request_logger,
};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use tracing::Level;
