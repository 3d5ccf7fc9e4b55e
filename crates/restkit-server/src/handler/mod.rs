//! HTTP handlers, the response envelope and handler errors.
//!
//! [`routes`] assembles the application router: recovery, access logging and
//! a request timeout wrap every route, and the `/users` subtree additionally
//! requires an access token.

mod auth;
mod error;
mod health;
mod response;
mod users;

pub use crate::handler::auth::{LoginRequest, RefreshRequest, SignupRequest};
pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::response::{Envelope, ErrorBody, Status};
use crate::middleware::{RecoveryConfig, logger, recovery, timeout};
use crate::routing::{Route, Router};
use crate::service::ServiceState;

/// Builds the application router mounted at `/`.
///
/// # Errors
///
/// Returns a routing error if the route table is inconsistent.
pub fn routes(state: ServiceState, config: &RecoveryConfig) -> crate::Result<Router> {
    Router::builder("/")
        .middleware(recovery(config.environment))
        .middleware(logger())
        .middleware(timeout(config.request_timeout()))
        .routes(health::routes())
        .route(Route::nest(auth::ROUTER_PATH, auth::router(&state)?))
        .route(Route::nest(users::ROUTER_PATH, users::router(&state)?))
        .build()
}


#[cfg(test)]
mod tests {
    use axum::http::header::AUTHORIZATION;
    use axum::http::{HeaderValue, StatusCode};
    use serde_json::{Value, json};

    use super::test::create_test_server;

    fn bearer(token: &Value) -> anyhow::Result<HeaderValue> {
        let token = token.as_str().unwrap_or_default();
        Ok(HeaderValue::from_str(&format!("Bearer {token}"))?)
    }

    #[tokio::test]
    async fn login_then_access_protected_route() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let login: Value = server
            .post("/auth/login")
            .json(&json!({ "email": "alice@example.com", "password": "correct-horse" }))
            .await
            .json();
        let access_token = &login["data"]["tokens"]["accessToken"];

        let response = server
            .get("/users/")
            .add_header(AUTHORIZATION, bearer(access_token)?)
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["data"]["user"], "alice@example.com");

        let response = server
            .get("/users/hello")
            .add_header(AUTHORIZATION, bearer(access_token)?)
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"], "hello");
        Ok(())
    }

    #[tokio::test]
    async fn protected_route_rejects_bad_credentials() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/users/").await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let response = server
            .get("/users/")
            .add_header(AUTHORIZATION, HeaderValue::from_static("Token xyz"))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let body: Value = response.json();
        assert_eq!(body["status"], "error");
        assert_eq!(body["statusCode"], 401);
        assert_eq!(body["message"], "Unauthorized");
        assert_eq!(body["error"]["name"], "Unauthorized");
        Ok(())
    }

    #[tokio::test]
    async fn refresh_issues_new_pair() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let login: Value = server
            .post("/auth/login")
            .json(&json!({ "email": "alice@example.com", "password": "correct-horse" }))
            .await
            .json();

        let response = server
            .post("/auth/refresh")
            .json(&json!({ "refreshToken": login["data"]["tokens"]["refreshToken"] }))
            .await;
        response.assert_status_ok();

        let refreshed: Value = response.json();
        let access_token = &refreshed["data"]["tokens"]["accessToken"];

        let response = server
            .get("/users/")
            .add_header(AUTHORIZATION, bearer(access_token)?)
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["user"], "alice@example.com");
        Ok(())
    }

    #[tokio::test]
    async fn refresh_rejects_garbage() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let response = server
            .post("/auth/refresh")
            .json(&json!({ "refreshToken": "not-a-token" }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() -> anyhow::Result<()> {
        let server = create_test_server()?;

        for path in ["/nope", "/users", "/auth/login/extra"] {
            let response = server.get(path).await;
            response.assert_status(StatusCode::NOT_FOUND);

            let body: Value = response.json();
            assert_eq!(body["error"]["name"], "NotFound", "{path}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn wrong_method_on_exact_route_is_not_found() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let response = server.get("/auth/login").await;

        response.assert_status(StatusCode::NOT_FOUND);
        Ok(())
    }
}
