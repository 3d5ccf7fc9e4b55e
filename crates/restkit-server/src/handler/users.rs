//! Routes behind the auth guard.

use serde::Serialize;

use super::response::Envelope;
use crate::extract::AuthUser;
use crate::middleware::auth_guard;
use crate::routing::{Handler, Route, Router};
use crate::service::ServiceState;

/// Mount path of the users router.
pub const ROUTER_PATH: &str = "/users";

/// The authenticated caller.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub user: String,
}

async fn current_user(user: AuthUser) -> Envelope<CurrentUser> {
    Envelope::success(CurrentUser { user: user.subject })
}

async fn hello() -> Envelope<&'static str> {
    Envelope::success("hello")
}

/// Returns the users router, mounted at [`ROUTER_PATH`].
pub fn router(state: &ServiceState) -> crate::Result<Router> {
    Router::builder(ROUTER_PATH)
        .middleware(auth_guard(state.tokens.clone()))
        .route(Route::get("/", Handler::from_axum(current_user, ())))
        .route(Route::get("/hello", Handler::from_axum(hello, ())))
        .build()
}
