//! HTTP server startup.

use std::future::IntoFuture;
use std::io;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use super::error::{ServerError, ServerResult};
use super::lifecycle::serve_with_shutdown;
use super::shutdown::{cancel_on_signal, drain};
use crate::TRACING_TARGET_SERVER_STARTUP;
use crate::config::ServerConfig;

/// Binds the configured address and serves `app` with graceful shutdown.
///
/// # Errors
///
/// Returns [`ServerError::BindError`] if the address cannot be bound, or
/// [`ServerError::Runtime`] if serving fails.
pub async fn serve_http(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    let bind_address = server_config.bind_address();
    let listener = bind(&server_config).await.map_err(|err| {
        let err = ServerError::bind_error(&bind_address, err);
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %bind_address,
            error = %err,
            suggestion = err.suggestion(),
            "failed to bind to address"
        );
        err
    })?;

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    let shutdown_timeout = server_config.shutdown_timeout();
    serve_with_shutdown(&server_config, || async move {
        let server = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .into_future();

        drain(server, &shutdown, shutdown_timeout).await
    })
    .await
}

async fn bind(server_config: &ServerConfig) -> io::Result<TcpListener> {
    let addr = server_config.resolve_addr().await?;
    let listener = TcpListener::bind(addr).await?;

    tracing::debug!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %addr,
        "bound to address"
    );

    Ok(listener)
}
