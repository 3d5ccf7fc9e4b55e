use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::IntoResponse;

use super::handler::Handler;

type LayerFn = dyn Fn(Handler) -> Handler + Send + Sync;

/// A named function from handler to handler.
///
/// Applying a middleware never mutates the wrapped handler: it returns a new
/// handler that runs its own logic around the inner one.
#[derive(Clone)]
pub struct Middleware {
    name: Cow<'static, str>,
    layer: Arc<LayerFn>,
}

impl Middleware {
    /// Creates a middleware from a handler transformation.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, layer: F) -> Self
    where
        F: Fn(Handler) -> Handler + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            layer: Arc::new(layer),
        }
    }

    /// Creates a middleware from an async function receiving the request and
    /// the next handler.
    ///
    /// ```
    /// use axum::extract::Request;
    /// use restkit_server::routing::{Handler, Middleware};
    ///
    /// let passthrough = Middleware::from_fn("passthrough", |request: Request, next: Handler| async move {
    ///     next.call(request).await
    /// });
    /// assert_eq!(passthrough.name(), "passthrough");
    /// ```
    pub fn from_fn<F, Fut, R>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(Request, Handler) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        Self::new(name, move |next: Handler| {
            let f = f.clone();
            Handler::new(move |request| f(request, next.clone()))
        })
    }

    /// Returns the middleware name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wraps `handler`.
    #[inline]
    pub fn wrap(&self, handler: Handler) -> Handler {
        (self.layer)(handler)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Middleware").field(&self.name).finish()
    }
}

/// Ordered list of middlewares.
///
/// `[m1, m2]` applied to `h` yields `m1(m2(h))`: the first middleware is the
/// outermost and sees the request first.
#[derive(Debug, Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Middleware>,
}

impl MiddlewareChain {
    /// Creates a chain from middlewares listed outermost first.
    pub fn new(middlewares: Vec<Middleware>) -> Self {
        Self { middlewares }
    }

    /// Wraps `handler` with every middleware of the chain.
    pub fn wrap(&self, handler: Handler) -> Handler {
        self.middlewares
            .iter()
            .rev()
            .fold(handler, |inner, middleware| middleware.wrap(inner))
    }

    /// Returns the middleware names, outermost first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.middlewares.iter().map(Middleware::name)
    }

    /// Returns the number of middlewares.
    #[inline]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Returns `true` if the chain has no middleware.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}
