use std::time::Instant;

use axum::extract::Request;

use crate::routing::{Handler, Middleware};
use crate::utility::tracing_targets::TRACING_TARGET_REQUEST;

/// Logs the method, path, status and elapsed time of every request.
pub fn logger() -> Middleware {
    Middleware::from_fn("logger", |request: Request, next: Handler| async move {
        let started_at = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_owned();

        let response = next.call(request).await;

        tracing::info!(
            target: TRACING_TARGET_REQUEST,
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "request handled"
        );

        response
    })
}
