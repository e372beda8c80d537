//! Route handlers and the endpoint that ends every middleware chain.
//!
//! A route's `async fn` is turned into an [`Endpoint`] when it is registered.
//! [`Next`](crate::middleware::Next) calls that endpoint once the last layer
//! has passed the request on, so a request logger installed by a layer is
//! still alive while the handler's future runs.

use std::future::Future;
use std::sync::Arc;

use crate::middleware::BoxFuture;
use crate::request::Request;
use crate::response::IntoResponse;

/// Implemented for every valid route handler:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// Sealed; the blanket impl over `Fn(Request) -> Future` is the only one.
pub trait Handler: sealed::IntoEndpoint + Send + Sync + 'static {}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

pub(crate) use sealed::{Endpoint, IntoEndpoint};

pub(crate) mod sealed {
    use super::*;

    /// The innermost step of a chain: request in, boxed response future out.
    pub type Endpoint = Arc<dyn Fn(Request) -> BoxFuture + Send + Sync>;

    pub trait IntoEndpoint {
        fn into_endpoint(self) -> Endpoint;
    }

    impl<F, Fut, R> IntoEndpoint for F
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + Send + 'static,
    {
        fn into_endpoint(self) -> Endpoint {
            Arc::new(move |req: Request| -> BoxFuture {
                let fut = self(req);
                Box::pin(async move { fut.await.into_response() })
            })
        }
    }
}
