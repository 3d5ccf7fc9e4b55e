use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::handler::{Error, ErrorKind};

/// The authenticated caller, inserted by the [`auth_guard`] middleware.
///
/// Extracting it on a route without the guard rejects with `Unauthorized`.
///
/// [`auth_guard`]: crate::middleware::auth_guard
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Subject of the verified access token.
    pub subject: String,
}

impl AuthUser {
    /// Creates a new authenticated user.
    #[inline]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ErrorKind::Unauthorized.with_message("authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    #[tokio::test]
    async fn reads_request_extension() -> anyhow::Result<()> {
        let (mut parts, ()) = Request::new(()).into_parts();
        parts.extensions.insert(AuthUser::new("alice"));

        let user = AuthUser::from_request_parts(&mut parts, &())
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        assert_eq!(user.subject, "alice");
        Ok(())
    }

    #[tokio::test]
    async fn rejects_without_extension() {
        let (mut parts, ()) = Request::new(()).into_parts();
        let error = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Unauthorized);
    }
}
