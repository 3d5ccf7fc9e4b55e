//! Route tables, middleware composition and request dispatch.
//!
//! A [`RouterBuilder`] collects [`Route`]s and [`Middleware`]s. Building it
//! validates every route and produces an immutable [`Router`]:
//!
//! - terminal handlers match on the exact path and method (a route without a
//!   method matches any method)
//! - nested routers match on their prefix followed by `/`
//! - the router's middlewares wrap every route, nested routers included
//!
//! Resolution tries the exact path with the request method, then the exact
//! path with an any-method route, then the longest nested prefix. Anything
//! else is a 404 envelope.

mod dispatch;
mod handler;
mod middleware;
mod path;
mod route;
mod router;

pub use self::handler::{Handler, HandlerFuture};
pub use self::middleware::{Middleware, MiddlewareChain};
pub use self::path::join;
pub use self::route::{Route, RouteTarget};
pub use self::router::{Router, RouterBuilder};
