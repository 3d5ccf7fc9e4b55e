use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::response::IntoResponse;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use crate::extract::AuthUser;
use crate::handler::{ErrorKind, Result};
use crate::routing::{Handler, Middleware};
use crate::service::TokenManager;
use crate::utility::tracing_targets::TRACING_TARGET_AUTHENTICATION;

/// Requires a valid access token in `Authorization: Bearer <token>`.
///
/// On success the token subject is stored as an [`AuthUser`] request
/// extension. Missing or malformed headers and failed verification all
/// answer 401 with `error.name == "Unauthorized"`.
pub fn auth_guard(tokens: TokenManager) -> Middleware {
    Middleware::from_fn("auth_guard", move |request: Request, next: Handler| {
        let tokens = tokens.clone();
        async move {
            let (mut parts, body) = request.into_parts();
            match authenticate(&tokens, &mut parts).await {
                Ok(user) => {
                    parts.extensions.insert(user);
                    next.call(Request::from_parts(parts, body)).await
                }
                Err(error) => error.into_response(),
            }
        }
    })
}

async fn authenticate(tokens: &TokenManager, parts: &mut Parts) -> Result<AuthUser> {
    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, &())
            .await
            .map_err(|rejection| {
                tracing::debug!(
                    target: TRACING_TARGET_AUTHENTICATION,
                    path = %parts.uri.path(),
                    error = %rejection,
                    "authorization header rejected"
                );

                if rejection.is_missing() {
                    ErrorKind::Unauthorized.with_message("missing bearer token")
                } else {
                    ErrorKind::Unauthorized.with_message("malformed authorization header")
                }
            })?;

    let claims = tokens.verify_access_token(bearer.token())?;

    tracing::debug!(
        target: TRACING_TARGET_AUTHENTICATION,
        subject = %claims.subject,
        "request authenticated"
    );

    Ok(AuthUser::new(claims.subject))
}

#[cfg(test)]
mod tests {
    use axum::http::header::AUTHORIZATION;
    use axum::http::{HeaderValue, StatusCode};
    use serde_json::Value;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::routing::{Route, Router};

    fn guarded_server(tokens: TokenManager) -> anyhow::Result<axum_test::TestServer> {
        let router = Router::builder("/")
            .middleware(auth_guard(tokens))
            .route(Route::get(
                "/me",
                Handler::from_axum(|user: AuthUser| async move { user.subject }, ()),
            ))
            .build()?;

        Ok(axum_test::TestServer::new(router.into_axum())?)
    }

    #[tokio::test]
    async fn valid_token_reaches_handler() -> anyhow::Result<()> {
        let tokens = TokenManager::for_tests();
        let pair = tokens.issue_pair("alice", &CancellationToken::new()).await?;
        let server = guarded_server(tokens)?;

        let header = HeaderValue::from_str(&format!("Bearer {}", pair.access.value))?;
        let response = server.get("/me").add_header(AUTHORIZATION, header).await;

        response.assert_status_ok();
        response.assert_text("alice");
        Ok(())
    }

    #[tokio::test]
    async fn rejects_missing_malformed_and_invalid_tokens() -> anyhow::Result<()> {
        let tokens = TokenManager::for_tests();
        let pair = tokens.issue_pair("alice", &CancellationToken::new()).await?;
        let server = guarded_server(tokens)?;

        let response = server.get("/me").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["error"]["name"], "Unauthorized");
        assert_eq!(body["error"]["message"], "missing bearer token");

        for value in [
            "Token xyz".to_owned(),
            "Bearer not-a-jwt".to_owned(),
            format!("Bearer {}", pair.refresh.value),
        ] {
            let response = server
                .get("/me")
                .add_header(AUTHORIZATION, HeaderValue::from_str(&value)?)
                .await;

            response.assert_status(StatusCode::UNAUTHORIZED);
            let body: Value = response.json();
            assert_eq!(body["status"], "error");
            assert_eq!(body["error"]["name"], "Unauthorized");
        }
        Ok(())
    }
}
