//! Middleware layer.
//!
//! Middleware intercepts every request on its way to a handler and every
//! response on its way back. It is the place for cross-cutting concerns; the
//! one shipped here is [`RequestLogging`], which gives each request its own
//! order-indexed logger.
//!
//! ```text
//! Router::handle(req)
//!   └─ layer 0 ── call(req, next)        ← first .layer() added, outermost
//!        └─ layer 1 ── call(req, next)
//!             └─ handler(req)            ← matched route, or 404
//! ```
//!
//! A middleware is any type implementing [`Middleware`], or any closure
//! `Fn(Request, Next) -> impl Future<Output = Response>`:
//!
//! ```rust
//! use seqlog::{Request, Router, middleware::Next};
//!
//! let app = Router::new()
//!     .layer(|req: Request, next: Next| async move {
//!         let mut res = next.run(req).await;
//!         res.set_header("x-served-by", "seqlog");
//!         res
//!     });
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::handler::Endpoint;
use crate::request::Request;
use crate::response::Response;

pub mod request_logger;

pub use request_logger::{
    CorrelationHeaders, RequestLoggerFactory, RequestLogging, TRAILER_MESSAGE, install,
    request_logger, retrieve,
};

/// The future a [`Middleware`] returns. `Send + 'static` so a layer can hold
/// request-scoped state, such as its logger, across the inner await.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A request interceptor.
///
/// `call` receives the request and the rest of the chain. It either calls
/// [`Next::run`] exactly once or answers on its own.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

impl<F, Fut> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        Box::pin(self(req, next))
    }
}

pub(crate) type Chain = Arc<[Arc<dyn Middleware>]>;

/// The remainder of the middleware chain, ending at the route's endpoint.
///
/// Consumed by [`run`](Next::run), so it can only be invoked once.
pub struct Next {
    chain: Chain,
    position: usize,
    endpoint: Endpoint,
}

impl Next {
    pub(crate) fn new(chain: Chain, endpoint: Endpoint) -> Self {
        Self { chain, position: 0, endpoint }
    }

    /// Passes `req` to the next middleware, or to the handler once the chain
    /// is exhausted.
    pub fn run(self, req: Request) -> BoxFuture {
        let current = self.chain.get(self.position).cloned();
        match current {
            Some(middleware) => {
                let next = Self { position: self.position + 1, ..self };
                middleware.call(req, next)
            }
            None => (self.endpoint)(req),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::handler::IntoEndpoint;
    use bytes::Bytes;
    use http::StatusCode;
    use parking_lot::Mutex;

    fn request() -> Request {
        Request::from_http(http::Request::builder().uri("/").body(Bytes::new()).unwrap())
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Marker(&'static str);

    #[tokio::test]
    async fn empty_chain_runs_handler() {
        let handler = (|_req: Request| async { StatusCode::ACCEPTED }).into_endpoint();
        let res = Next::new(Arc::from(Vec::new()), handler).run(request()).await;
        assert_eq!(res.status_code(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn layers_run_outermost_first() {
        let order = Arc::new(Mutex::new(Vec::new()));

        let record = |name: &'static str, order: Arc<Mutex<Vec<&'static str>>>| {
            Arc::new(move |req: Request, next: Next| {
                order.lock().push(name);
                next.run(req)
            }) as Arc<dyn Middleware>
        };

        let chain: Chain = vec![
            record("outer", Arc::clone(&order)),
            record("inner", Arc::clone(&order)),
        ]
        .into();
        let handler = (|_req: Request| async { "done" }).into_endpoint();
        let res = Next::new(chain, handler).run(request()).await;

        assert_eq!(res.body(), b"done");
        assert_eq!(*order.lock(), ["outer", "inner"]);
    }

    #[tokio::test]
    async fn middleware_context_reaches_handler() {
        let install = Arc::new(|req: Request, next: Next| {
            let ctx = req.context().with_value(Marker("set"));
            next.run(req.with_context(ctx))
        }) as Arc<dyn Middleware>;

        let handler = (|req: Request| async move {
            match req.context().value::<Marker>() {
                Some(Marker(v)) => v.to_string(),
                None => "missing".to_owned(),
            }
        })
        .into_endpoint();

        let res = Next::new(vec![install].into(), handler).run(request()).await;
        assert_eq!(res.body(), b"set");
        assert!(Context::new().value::<Marker>().is_none());
    }

    #[tokio::test]
    async fn middleware_can_short_circuit() {
        let deny = Arc::new(|_req: Request, _next: Next| async {
            Response::status(StatusCode::FORBIDDEN)
        }) as Arc<dyn Middleware>;
        let handler = (|_req: Request| async { "unreachable" }).into_endpoint();
        let res = Next::new(vec![deny].into(), handler).run(request()).await;
        assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
    }
}
