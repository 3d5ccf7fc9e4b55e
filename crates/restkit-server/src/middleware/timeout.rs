use std::time::Duration;

use axum::extract::Request;
use axum::response::IntoResponse;

use crate::handler::ErrorKind;
use crate::routing::{Handler, Middleware};
use crate::utility::tracing_targets::TRACING_TARGET_RECOVERY_ERROR;

/// Bounds downstream handling to `duration`.
///
/// On expiry the downstream future is dropped, which fires the drop guards of
/// any in-flight token operation, and a 408 envelope is returned.
pub fn timeout(duration: Duration) -> Middleware {
    Middleware::from_fn("timeout", move |request: Request, next: Handler| async move {
        let method = request.method().clone();
        let path = request.uri().path().to_owned();

        match tokio::time::timeout(duration, next.call(request)).await {
            Ok(response) => response,
            Err(_elapsed) => {
                tracing::warn!(
                    target: TRACING_TARGET_RECOVERY_ERROR,
                    method = %method,
                    path = %path,
                    timeout_ms = duration.as_millis() as u64,
                    "request timeout exceeded"
                );

                ErrorKind::RequestTimeout.into_response()
            }
        }
    })
}
