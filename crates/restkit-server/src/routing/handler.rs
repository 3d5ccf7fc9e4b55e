use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::extract::Request;
use axum::handler::Handler as AxumHandler;
use axum::response::{IntoResponse, Response};
use futures::future::{BoxFuture, FutureExt};

/// Future returned by [`Handler::call`].
pub type HandlerFuture = BoxFuture<'static, Response>;

type HandlerFn = dyn Fn(Request) -> HandlerFuture + Send + Sync;

/// Type-erased terminal request handler.
///
/// Cheap to clone: the function is shared behind an [`Arc`].
#[derive(Clone)]
pub struct Handler {
    inner: Arc<HandlerFn>,
}

impl Handler {
    /// Creates a handler from an async function of the raw request.
    pub fn new<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        let inner = move |request: Request| {
            let future = f(request);
            async move { future.await.into_response() }.boxed()
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Creates a handler from an axum handler and the state it extracts from.
    ///
    /// Lets route functions use axum extractors such as [`State`] or
    /// [`ValidateJson`].
    ///
    /// [`State`]: axum::extract::State
    /// [`ValidateJson`]: crate::extract::ValidateJson
    pub fn from_axum<H, T, S>(handler: H, state: S) -> Self
    where
        H: AxumHandler<T, S> + Sync,
        T: 'static,
        S: Clone + Send + Sync + 'static,
    {
        Self::new(move |request| handler.clone().call(request, state.clone()))
    }

    /// Handles `request`.
    #[inline]
    pub fn call(&self, request: Request) -> HandlerFuture {
        (self.inner)(request)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}
