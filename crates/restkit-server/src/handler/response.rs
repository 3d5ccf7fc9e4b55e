//! JSON response envelope shared by every endpoint.

use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Outcome of a request as reported in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Error details of a failed request.
#[must_use = "error bodies do nothing unless serialized"]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// The error name, e.g. `Unauthorized`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Cow<'static, str>>,
    /// What triggered the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<Cow<'static, str>>,
    /// Diagnostic trace. Never populated outside development builds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<Cow<'static, str>>,
    /// User-facing error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Cow<'static, str>>,
}

impl ErrorBody {
    /// Creates an error body with a name and message.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Sets the cause.
    pub fn with_cause(mut self, cause: impl Into<Cow<'static, str>>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

/// Response envelope: `{status, message, statusCode, data?, error?}`.
///
/// Unset fields are filled in when the envelope is turned into a response:
///
/// - a status code below 100 becomes `200`
/// - an unset status is `error` when an error is present or the code is
///   `>= 500`, otherwise `success`
/// - an empty message becomes the canonical reason phrase of the status code
#[must_use = "envelopes do nothing unless turned into a response"]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T = ()> {
    status: Option<Status>,
    message: Cow<'static, str>,
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
}

impl Envelope<()> {
    /// Creates an envelope without data.
    pub fn empty() -> Self {
        Self::with_data(None)
    }

    /// Creates an error envelope.
    pub fn error(status_code: StatusCode, error: ErrorBody) -> Self {
        Self::empty()
            .with_status_code(status_code)
            .with_error(error)
    }
}

impl<T> Envelope<T> {
    fn with_data(data: Option<T>) -> Self {
        Self {
            status: None,
            message: Cow::Borrowed(""),
            status_code: 0,
            data,
            error: None,
        }
    }

    /// Creates a successful envelope around `data`.
    pub fn success(data: T) -> Self {
        Self::with_data(Some(data))
    }

    /// Sets the status code.
    pub fn with_status_code(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code.as_u16();
        self
    }

    /// Sets the message.
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Sets the status explicitly.
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches error details.
    pub fn with_error(mut self, error: ErrorBody) -> Self {
        self.error = Some(error);
        self
    }

    /// Fills in the status code, status and message.
    pub fn normalize(mut self) -> Self {
        if self.status_code < 100 {
            self.status_code = StatusCode::OK.as_u16();
        }

        if self.error.is_some() {
            self.status = Some(Status::Error);
        } else if self.status.is_none() {
            self.status = Some(if self.status_code >= 500 {
                Status::Error
            } else {
                Status::Success
            });
        }

        if self.message.is_empty() {
            let reason = StatusCode::from_u16(self.status_code)
                .ok()
                .and_then(|code| code.canonical_reason())
                .unwrap_or_default();
            self.message = Cow::Borrowed(reason);
        }

        self
    }

    /// Returns the status, if set or normalized.
    #[inline]
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    /// Returns the message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the raw status code.
    #[inline]
    pub fn status_code(&self) -> u16 {
        self.status_code
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let envelope = self.normalize();
        let status = StatusCode::from_u16(envelope.status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(envelope)).into_response()
    }
}
