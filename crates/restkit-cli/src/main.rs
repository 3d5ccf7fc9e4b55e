#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use restkit_server::handler::routes;
use restkit_server::middleware::{RecoveryConfig, RouterObservabilityExt};
use restkit_server::service::{ServiceConfig, ServiceState};

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "restkit_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "restkit_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "restkit_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();
    cli.validate()?;

    let state = create_service_state(&cli.service)?;
    let router = create_router(state, &cli.recovery)?;

    server::serve(router, cli.server).await?;

    Ok(())
}

/// Creates the service state from configuration.
fn create_service_state(config: &ServiceConfig) -> anyhow::Result<ServiceState> {
    ServiceState::from_config(config).context("failed to create service state")
}

/// Creates the application router wrapped in the HTTP observability layers.
fn create_router(state: ServiceState, recovery: &RecoveryConfig) -> anyhow::Result<axum::Router> {
    let router = routes(state, recovery).context("failed to build routes")?;

    tracing::debug!(
        target: TRACING_TARGET_SERVER_STARTUP,
        routes = router.route_count(),
        "router built"
    );

    Ok(router.into_axum().with_observability())
}
