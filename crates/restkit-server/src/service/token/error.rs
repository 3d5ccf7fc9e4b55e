use std::borrow::Cow;

use tokio::task::JoinError;

use crate::BoxedError;

/// Result type for token operations.
pub type TokenResult<T, E = TokenError> = std::result::Result<T, E>;

/// Errors raised while signing or verifying tokens.
///
/// Verification failures are deliberately collapsed into a single
/// [`TokenError::InvalidToken`] variant: callers cannot tell a bad signature
/// from an expired or malformed token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Signature mismatch, expiry, wrong issuer or malformed token.
    #[error("invalid token")]
    InvalidToken,

    /// The token could not be produced.
    #[error("failed to sign token: {message}")]
    Signing {
        message: Cow<'static, str>,
        #[source]
        source: Option<BoxedError>,
    },

    /// The caller cancelled the operation before both legs completed.
    #[error("token operation was cancelled")]
    Cancelled,

    /// A signing or verification task panicked or was aborted.
    #[error("token task failed: {0}")]
    TaskFailed(#[from] JoinError),
}

impl TokenError {
    /// Creates a signing error without a source.
    #[inline]
    pub fn signing(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Signing {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a signing error caused by `source`.
    #[inline]
    pub fn signing_with_source(
        message: impl Into<Cow<'static, str>>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Signing {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns `true` for [`TokenError::InvalidToken`].
    #[inline]
    #[must_use]
    pub const fn is_invalid_token(&self) -> bool {
        matches!(self, Self::InvalidToken)
    }
}
