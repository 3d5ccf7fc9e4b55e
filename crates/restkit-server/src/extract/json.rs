//! JSON request bodies with validation.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Json, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::handler::{Error, ErrorKind};
use crate::utility::tracing_targets::TRACING_TARGET_REQUEST;

/// JSON extractor that validates the body with the `validator` crate.
///
/// Malformed bodies and failed validation both reject with a `BadRequest`
/// error envelope.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        data.validate()?;
        Ok(Self(data))
    }
}

impl From<JsonRejection> for Error<'static> {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(
            target: TRACING_TARGET_REQUEST,
            error = %rejection,
            "request body rejected"
        );

        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => "Expected a JSON request body",
            JsonRejection::JsonSyntaxError(_) => "Malformed JSON request body",
            JsonRejection::JsonDataError(_) => "Invalid request body",
            _ => "Unreadable request body",
        };

        ErrorKind::BadRequest
            .with_message(message)
            .with_cause(rejection.body_text())
    }
}

fn format_validation_error(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return format!("Field '{field}': {message}");
    }

    match error.code.as_ref() {
        "email" => format!("Field '{field}' must be a valid email address"),
        "length" => {
            let min = error.params.get("min").and_then(serde_json::Value::as_u64);
            let max = error.params.get("max").and_then(serde_json::Value::as_u64);
            match (min, max) {
                (Some(min), Some(max)) => {
                    format!("Field '{field}' must be between {min} and {max} characters long")
                }
                (Some(min), None) => format!("Field '{field}' must be at least {min} characters long"),
                (None, Some(max)) => format!("Field '{field}' must be at most {max} characters long"),
                (None, None) => format!("Field '{field}' has invalid length"),
            }
        }
        "required" => format!("Field '{field}' is required"),
        code => format!("Field '{field}' failed validation: {code}"),
    }
}

impl From<ValidationErrors> for Error<'static> {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, field_errors)| {
                field_errors
                    .iter()
                    .map(move |error| format_validation_error(field, error))
            })
            .collect();
        messages.sort();

        tracing::debug!(
            target: TRACING_TARGET_REQUEST,
            errors = ?messages,
            "request validation failed"
        );

        let message = match messages.as_slice() {
            [] => "Validation failed".to_owned(),
            messages => messages.join(". "),
        };

        ErrorKind::BadRequest.with_message(message)
    }
}
