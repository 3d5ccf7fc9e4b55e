//! Login, signup and token refresh.
//!
//! No user store exists: any well-formed credentials are accepted and the
//! email becomes the token subject.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use validator::Validate;

use super::response::Envelope;
use super::{ErrorKind, Result};
use crate::extract::ValidateJson;
use crate::routing::{Handler, Route, Router};
use crate::service::token::{AuthTokenPair, IdToken};
use crate::service::{ServiceState, TokenManager};
use crate::utility::tracing_targets::TRACING_TARGET_AUTHENTICATION;

/// Mount path of the auth router.
pub const ROUTER_PATH: &str = "/auth";

/// Login credentials.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Signup details.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
}

/// Refresh token exchange.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// Tokens issued on login and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokensResponse {
    pub tokens: AuthTokenPair,
}

/// Tokens issued on signup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub tokens: AuthTokenPair,
    #[serde(flatten)]
    pub id_token: IdToken,
}

async fn login(
    State(tokens): State<TokenManager>,
    ValidateJson(request): ValidateJson<LoginRequest>,
) -> Result<Envelope<TokensResponse>> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let tokens = tokens.issue_pair(&request.email, &cancel).await?;

    tracing::info!(
        target: TRACING_TARGET_AUTHENTICATION,
        subject = %request.email,
        "login succeeded"
    );

    Ok(Envelope::success(TokensResponse { tokens }))
}

async fn signup(
    State(tokens): State<TokenManager>,
    ValidateJson(request): ValidateJson<SignupRequest>,
) -> Result<Envelope<SignupResponse>> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let id_token = tokens.issue_id_token(&request.email)?;
    let pair = tokens.issue_pair(&request.email, &cancel).await?;

    tracing::info!(
        target: TRACING_TARGET_AUTHENTICATION,
        subject = %request.email,
        name = request.name.as_deref().unwrap_or_default(),
        "signup succeeded"
    );

    Ok(Envelope::success(SignupResponse {
        tokens: pair,
        id_token,
    }))
}

async fn refresh(
    State(tokens): State<TokenManager>,
    ValidateJson(request): ValidateJson<RefreshRequest>,
) -> Result<Envelope<TokensResponse>> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let claims = tokens
        .verify_refresh_token(&request.refresh_token)
        .map_err(|_| ErrorKind::Unauthorized.with_message("invalid refresh token"))?;
    let tokens = tokens.issue_pair(&claims.subject, &cancel).await?;

    tracing::debug!(
        target: TRACING_TARGET_AUTHENTICATION,
        subject = %claims.subject,
        "token pair refreshed"
    );

    Ok(Envelope::success(TokensResponse { tokens }))
}

/// Returns the auth router, mounted at [`ROUTER_PATH`].
pub fn router(state: &ServiceState) -> crate::Result<Router> {
    Router::builder(ROUTER_PATH)
        .route(Route::post("/login", Handler::from_axum(login, state.clone())))
        .route(Route::post("/signup", Handler::from_axum(signup, state.clone())))
        .route(Route::post("/refresh", Handler::from_axum(refresh, state.clone())))
        .build()
}
