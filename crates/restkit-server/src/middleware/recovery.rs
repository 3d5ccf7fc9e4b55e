//! Panic recovery.
//!
//! The [`recovery`] middleware catches panics raised anywhere downstream and
//! answers with a 500 envelope. The panic message is always logged; it is
//! only sent to the client in [`Environment::Development`].

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::handler::ErrorKind;
use crate::routing::{Handler, Middleware};
use crate::utility::tracing_targets::TRACING_TARGET_RECOVERY_PANIC;

type Panic = Box<dyn Any + Send + 'static>;

/// Deployment environment.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(strum::Display, strum::EnumString)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    /// Panic messages are included in error responses.
    #[cfg_attr(feature = "config", value(alias = "dev"))]
    #[strum(to_string = "development", serialize = "dev")]
    Development,
    /// Error responses never carry diagnostics.
    #[default]
    #[cfg_attr(feature = "config", value(alias = "prod"))]
    #[strum(to_string = "production", serialize = "prod")]
    Production,
}

impl Environment {
    /// Returns `true` in development.
    #[inline]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Configuration for recovery middleware behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct RecoveryConfig {
    /// Deployment environment. Controls whether panic messages reach clients.
    #[cfg_attr(
        feature = "config",
        arg(long = "app-env", env = "APP_ENV", value_enum, default_value_t = Environment::Production)
    )]
    #[serde(default)]
    pub environment: Environment,

    /// Maximum duration in seconds to wait for a request to complete before timing out.
    /// Requests exceeding this duration receive a 408 response.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "REQUEST_TIMEOUT", default_value = "30")
    )]
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl RecoveryConfig {
    /// Sets the environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout = secs;
        self
    }

    /// Returns the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Catches downstream panics and converts them into 500 envelopes.
///
/// Place it first in the root router so that it wraps everything else.
pub fn recovery(environment: Environment) -> Middleware {
    Middleware::from_fn("recovery", move |request: Request, next: Handler| async move {
        let handling = AssertUnwindSafe(async move { next.call(request).await });
        match handling.catch_unwind().await {
            Ok(response) => response,
            Err(panic) => catch_panic(panic, environment),
        }
    })
}

fn catch_panic(panic: Panic, environment: Environment) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic type");

    tracing::error!(
        target: TRACING_TARGET_RECOVERY_PANIC,
        message = %message,
        "service panic"
    );

    let error = ErrorKind::InternalServerError.with_message("An unexpected panic occurred");
    if environment.is_development() {
        error.with_cause(message.to_owned()).into_response()
    } else {
        error.into_response()
    }
}
