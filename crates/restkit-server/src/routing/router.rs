use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use futures::future::{BoxFuture, FutureExt};
use tower::Service;

use super::dispatch::DispatchTable;
use super::handler::{Handler, HandlerFuture};
use super::middleware::{Middleware, MiddlewareChain};
use super::path::{has_dot_segment, join, with_trailing_slash};
use super::route::{Route, RouteTarget};
use crate::handler::ErrorKind;
use crate::utility::tracing_targets::TRACING_TARGET_ROUTER;
use crate::{Error, Result};

/// Unbuilt router: collects middlewares and routes.
///
/// Call [`RouterBuilder::build`] to validate the routes and obtain a
/// [`Router`]. Routes cannot be added afterwards.
#[derive(Debug)]
#[must_use = "routers do nothing unless built"]
pub struct RouterBuilder {
    prefix: String,
    middlewares: Vec<Middleware>,
    routes: Vec<Route>,
}

impl RouterBuilder {
    /// Appends a middleware. The first one added is the outermost.
    pub fn middleware(mut self, middleware: Middleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Appends several middlewares.
    pub fn middlewares(mut self, middlewares: impl IntoIterator<Item = Middleware>) -> Self {
        self.middlewares.extend(middlewares);
        self
    }

    /// Appends a route.
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Appends several routes.
    pub fn routes(mut self, routes: impl IntoIterator<Item = Route>) -> Self {
        self.routes.extend(routes);
        self
    }

    /// Builds the dispatch table.
    ///
    /// # Errors
    ///
    /// Returns a routing error if the prefix or a route path does not start
    /// with `/` or contains a `.` or `..` segment, if a `(method, path)` pair is registered twice, or if a nested
    /// router is mounted somewhere other than its own prefix.
    pub fn build(self) -> Result<Router> {
        if !self.prefix.starts_with('/') {
            return Err(Error::routing(format!(
                "router prefix `{}` must start with `/`",
                self.prefix
            )));
        }

        if has_dot_segment(&self.prefix) {
            return Err(Error::routing(format!(
                "router prefix `{}` must not contain `.` or `..` segments",
                self.prefix
            )));
        }

        let prefix = join(&self.prefix, "");
        let chain = MiddlewareChain::new(self.middlewares);
        let mut table = DispatchTable::default();

        tracing::debug!(
            target: TRACING_TARGET_ROUTER,
            prefix = %prefix,
            middlewares = ?chain.names().collect::<Vec<_>>(),
            "building router"
        );

        for route in self.routes {
            let (method, path, target) = route.into_parts();
            if !path.starts_with('/') {
                return Err(Error::routing(format!(
                    "route path `{path}` must start with `/`"
                )));
            }

            if has_dot_segment(&path) {
                return Err(Error::routing(format!(
                    "route path `{path}` must not contain `.` or `..` segments"
                )));
            }

            let full_path = join(&prefix, &path);
            match target {
                RouteTarget::Handler(handler) => {
                    tracing::debug!(
                        target: TRACING_TARGET_ROUTER,
                        method = method.as_ref().map_or("*", |m| m.as_str()),
                        path = %full_path,
                        "handler mapped"
                    );

                    table.insert_exact(method, full_path, chain.wrap(handler))?;
                }
                RouteTarget::Router(nested) => {
                    let mount = with_trailing_slash(&full_path);
                    let expected = with_trailing_slash(nested.prefix());
                    if mount != expected {
                        return Err(Error::routing(format!(
                            "router with prefix `{}` cannot be mounted at `{mount}`",
                            nested.prefix()
                        )));
                    }

                    tracing::debug!(
                        target: TRACING_TARGET_ROUTER,
                        method = method.as_ref().map_or("*", |m| m.as_str()),
                        prefix = %mount,
                        "router mounted"
                    );

                    table.insert_prefix(method, mount, chain.wrap(nested.into_handler()))?;
                }
            }
        }

        let fallback = chain.wrap(Handler::new(|request: Request| async move {
            tracing::debug!(
                target: TRACING_TARGET_ROUTER,
                method = %request.method(),
                path = %request.uri().path(),
                "no route matched"
            );

            ErrorKind::NotFound.into_response()
        }));

        Ok(Router {
            inner: Arc::new(RouterInner {
                prefix,
                table,
                fallback,
            }),
        })
    }
}

struct RouterInner {
    prefix: String,
    table: DispatchTable,
    fallback: Handler,
}

/// Built router: an immutable dispatch table behind an [`Arc`].
///
/// Clones share the table and can serve requests concurrently. The router is
/// a [`tower::Service`], so it can be served directly or through
/// [`Router::into_axum`].
///
/// ```
/// use axum::http::Method;
/// use restkit_server::routing::{Handler, Route, Router};
///
/// # fn main() -> restkit_server::Result<()> {
/// let router = Router::builder("/")
///     .route(Route::get("/ping", Handler::new(|_request| async { "pong" })))
///     .build()?;
///
/// assert_eq!(router.prefix(), "/");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Router {
    /// Starts a router mounted at `prefix`.
    pub fn builder(prefix: impl Into<String>) -> RouterBuilder {
        RouterBuilder {
            prefix: prefix.into(),
            middlewares: Vec::new(),
            routes: Vec::new(),
        }
    }

    /// Builds a router from its prefix, middlewares and routes.
    ///
    /// # Errors
    ///
    /// See [`RouterBuilder::build`].
    pub fn new(
        prefix: impl Into<String>,
        middlewares: impl IntoIterator<Item = Middleware>,
        routes: impl IntoIterator<Item = Route>,
    ) -> Result<Self> {
        Self::builder(prefix)
            .middlewares(middlewares)
            .routes(routes)
            .build()
    }

    /// Returns the normalized prefix.
    #[inline]
    pub fn prefix(&self) -> &str {
        &self.inner.prefix
    }

    /// Returns the number of registered routes.
    #[inline]
    pub fn route_count(&self) -> usize {
        self.inner.table.len()
    }

    /// Resolves `request` and runs the matched handler.
    ///
    /// Unmatched requests get a 404 envelope.
    pub fn dispatch(&self, request: Request) -> HandlerFuture {
        let path = request.uri().path();
        match self.inner.table.resolve(request.method(), path) {
            Some(handler) => handler.call(request),
            None => self.inner.fallback.call(request),
        }
    }

    /// Converts the router into a handler, for mounting it into a parent.
    pub fn into_handler(self) -> Handler {
        Handler::new(move |request| self.dispatch(request))
    }

    /// Converts the router into an `axum::`[`Router`] that forwards every
    /// request to it.
    ///
    /// [`Router`]: axum::Router
    pub fn into_axum(self) -> axum::Router {
        axum::Router::new().fallback_service(self)
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("prefix", &self.inner.prefix)
            .field("table", &self.inner.table)
            .finish()
    }
}

impl Service<Request> for Router {
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;
    type Response = Response;

    #[inline]
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        self.dispatch(request).map(Ok).boxed()
    }
}
