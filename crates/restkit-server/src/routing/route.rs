use std::borrow::Cow;
use std::future::Future;

use axum::extract::Request;
use axum::http::Method;
use axum::response::IntoResponse;

use super::handler::Handler;
use super::router::Router;

/// What a route dispatches to.
#[derive(Debug, Clone)]
pub enum RouteTarget {
    /// A terminal handler, matched on the exact path.
    Handler(Handler),
    /// A nested router, matched on a path prefix.
    Router(Router),
}

impl From<Handler> for RouteTarget {
    #[inline]
    fn from(handler: Handler) -> Self {
        Self::Handler(handler)
    }
}

impl From<Router> for RouteTarget {
    #[inline]
    fn from(router: Router) -> Self {
        Self::Router(router)
    }
}

/// A single entry of a route table.
#[derive(Debug, Clone)]
pub struct Route {
    method: Option<Method>,
    path: Cow<'static, str>,
    target: RouteTarget,
}

impl Route {
    /// Creates a route. A `None` method matches every method.
    pub fn new(
        method: Option<Method>,
        path: impl Into<Cow<'static, str>>,
        target: impl Into<RouteTarget>,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            target: target.into(),
        }
    }

    /// Routes `GET` requests on `path` to `handler`.
    pub fn get(path: impl Into<Cow<'static, str>>, handler: Handler) -> Self {
        Self::new(Some(Method::GET), path, handler)
    }

    /// Routes `POST` requests on `path` to `handler`.
    pub fn post(path: impl Into<Cow<'static, str>>, handler: Handler) -> Self {
        Self::new(Some(Method::POST), path, handler)
    }

    /// Routes requests of any method on `path` to `handler`.
    pub fn any(path: impl Into<Cow<'static, str>>, handler: Handler) -> Self {
        Self::new(None, path, handler)
    }

    /// Routes `GET` requests on `path` to an async function of the raw request.
    pub fn get_fn<F, Fut, R>(path: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        Self::get(path, Handler::new(f))
    }

    /// Mounts `router` under `path` for every method.
    pub fn nest(path: impl Into<Cow<'static, str>>, router: Router) -> Self {
        Self::new(None, path, router)
    }

    /// Returns the method filter.
    #[inline]
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    /// Returns the path relative to the router prefix.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the route target.
    #[inline]
    pub fn target(&self) -> &RouteTarget {
        &self.target
    }

    pub(crate) fn into_parts(self) -> (Option<Method>, Cow<'static, str>, RouteTarget) {
        (self.method, self.path, self.target)
    }
}
