//! HTTP errors returned by handlers and middlewares.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::response::{Envelope, ErrorBody};
use crate::service::token::TokenError;
use crate::utility::tracing_targets::TRACING_TARGET_AUTHENTICATION;

/// The error type for HTTP handlers.
///
/// Turns into an error [`Envelope`] whose `error.name` is the kind name and
/// whose `error.message` is either the custom message or the kind default.
#[derive(Clone)]
#[must_use = "errors do nothing unless serialized"]
pub struct Error<'a> {
    kind: ErrorKind,
    message: Option<Cow<'a, str>>,
    cause: Option<Cow<'a, str>>,
}

impl Error<'static> {
    /// Creates a new [`Error`] with the specified kind.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            cause: None,
        }
    }
}

impl<'a> Error<'a> {
    /// Sets a custom user-facing message.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            message: Some(message.into()),
            ..self
        }
    }

    /// Sets the cause reported in `error.cause`.
    #[inline]
    pub fn with_cause(self, cause: impl Into<Cow<'a, str>>) -> Self {
        Self {
            cause: Some(cause.into()),
            ..self
        }
    }

    /// Returns the error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the custom message if present.
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the cause if present.
    #[inline]
    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }

    /// Converts this error into a static version by cloning all borrowed data.
    pub fn into_static(self) -> Error<'static> {
        Error {
            kind: self.kind,
            message: self.message.map(|m| Cow::Owned(m.into_owned())),
            cause: self.cause.map(|c| Cow::Owned(c.into_owned())),
        }
    }
}

impl Default for Error<'static> {
    #[inline]
    fn default() -> Self {
        Self::new(ErrorKind::default())
    }
}

impl fmt::Debug for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("status", &self.kind.status_code())
            .field("message", &self.message)
            .field("cause", &self.cause)
            .finish()
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.message.as_deref().unwrap_or(self.kind.default_message());
        write!(f, "{} ({}): {}", self.kind, self.kind.status_code(), message)?;

        if let Some(ref cause) = self.cause {
            write!(f, " - {cause}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error<'_> {}

impl IntoResponse for Error<'_> {
    fn into_response(self) -> Response {
        let message = self
            .message
            .map(|m| Cow::Owned(m.into_owned()))
            .unwrap_or(Cow::Borrowed(self.kind.default_message()));

        let mut body = ErrorBody::new(self.kind.name(), message);
        if let Some(cause) = self.cause {
            body = body.with_cause(cause.into_owned());
        }

        Envelope::error(self.kind.status_code(), body).into_response()
    }
}

impl From<ErrorKind> for Error<'static> {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<TokenError> for Error<'static> {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::InvalidToken => ErrorKind::Unauthorized.with_message("invalid token"),
            error => {
                tracing::error!(
                    target: TRACING_TARGET_AUTHENTICATION,
                    error = %error,
                    "token operation failed"
                );

                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}

/// A specialized [`Result`] type for HTTP handlers.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error<'static>> = std::result::Result<T, E>;

/// Kinds of HTTP errors.
#[must_use = "error kinds do nothing unless used to create errors"]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 400 Bad Request - Malformed body or invalid credentials.
    BadRequest,
    /// 401 Unauthorized - Missing, malformed or invalid token.
    Unauthorized,
    /// 404 Not Found - No route matched.
    NotFound,
    /// 408 Request Timeout - Handling exceeded the configured timeout.
    RequestTimeout,
    /// 500 Internal Server Error - Unexpected server error.
    #[default]
    InternalServerError,
}

impl ErrorKind {
    /// Converts this error kind into a full [`Error`].
    #[inline]
    pub fn into_error(self) -> Error<'static> {
        Error::new(self)
    }

    /// Creates an [`Error`] with the specified message.
    #[inline]
    pub fn with_message<'a>(self, message: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error {
            kind: self,
            message: Some(message.into()),
            cause: None,
        }
    }

    /// Returns the name reported in `error.name`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::BadRequest => "BadRequest",
            Self::Unauthorized => "Unauthorized",
            Self::NotFound => "NotFound",
            Self::RequestTimeout => "RequestTimeout",
            Self::InternalServerError => "InternalServerError",
        }
    }

    /// Returns the HTTP status code for this error kind.
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the message used when no custom message is set.
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::BadRequest => "The request could not be processed due to invalid data",
            Self::Unauthorized => "Invalid or expired authentication credentials",
            Self::NotFound => "The requested resource was not found",
            Self::RequestTimeout => "Request timeout",
            Self::InternalServerError => "An internal server error occurred",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        self.into_error().into_response()
    }
}
