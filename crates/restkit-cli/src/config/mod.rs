//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig       # Host, port, shutdown
//! ├── recovery: RecoveryConfig   # Environment, request timeout
//! └── service: ServiceConfig     # JWT issuer, secrets, lifetimes
//! ```
//!
//! All configuration can be provided via CLI arguments or environment
//! variables. Use `--help` to see all available options.

mod server;

use std::process;

use anyhow::{Context, anyhow};
use clap::Parser;
use restkit_server::middleware::RecoveryConfig;
use restkit_server::service::ServiceConfig;
pub use server::ServerConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Longest accepted request timeout, in seconds.
const MAX_REQUEST_TIMEOUT: u64 = 300;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "restkit")]
#[command(about = "restkit HTTP service")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// Panic recovery and request timeout configuration.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,

    /// Token issuer, secrets and lifetimes.
    #[clap(flatten)]
    pub service: ServiceConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded first so that clap picks its values up as
    /// environment defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with `RUST_LOG` filtering, `info` by default.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;

        let timeout = self.recovery.request_timeout;
        if timeout == 0 || timeout > MAX_REQUEST_TIMEOUT {
            return Err(anyhow!(
                "Request timeout {timeout} seconds is invalid. Must be between 1 and {MAX_REQUEST_TIMEOUT} seconds."
            ));
        }

        Ok(())
    }

    /// Logs configuration (no secrets).
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            "starting restkit server"
        );

        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "build information"
        );

        self.server.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            environment = %self.recovery.environment,
            request_timeout_secs = self.recovery.request_timeout,
            jwt_issuer = %self.service.jwt_issuer,
            "service configuration"
        );
    }

    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use restkit_server::middleware::Environment;

    use super::*;

    const REQUIRED: [&str; 15] = [
        "restkit",
        "--jwt-issuer",
        "restkit",
        "--jwt-id-token-secret",
        "id-secret",
        "--jwt-id-token-expiration",
        "1h",
        "--jwt-access-token-secret",
        "access-secret",
        "--jwt-access-token-expiration",
        "15m",
        "--jwt-refresh-token-secret",
        "refresh-secret",
        "--jwt-refresh-token-expiration",
        "24h",
    ];

    fn parse(extra: &[&str]) -> anyhow::Result<Cli> {
        let args = REQUIRED.iter().chain(extra);
        Ok(Cli::try_parse_from(args)?)
    }

    #[test]
    fn parse_flags() -> anyhow::Result<()> {
        let cli = parse(&["--port", "8080", "--app-env", "dev", "--request-timeout", "5"])?;

        assert_eq!(cli.server.port, 8080);
        assert_eq!(cli.recovery.environment, Environment::Development);
        assert_eq!(cli.recovery.request_timeout, 5);
        assert_eq!(cli.service.access_token_expiration, "15m");
        cli.validate()?;
        Ok(())
    }

    #[test]
    fn empty_host_and_port_use_defaults() -> anyhow::Result<()> {
        let cli = parse(&["--host", "", "--port", ""])?;

        assert_eq!(cli.server.port, 4000);
        assert!(cli.server.binds_to_all_interfaces());
        assert_eq!(cli.server.bind_address(), "0.0.0.0:4000");
        cli.validate()?;
        Ok(())
    }

    #[test]
    fn host_name_is_accepted() -> anyhow::Result<()> {
        let cli = parse(&["--host", "localhost"])?;

        assert_eq!(cli.server.host, "localhost");
        assert_eq!(cli.server.bind_address(), "localhost:4000");
        Ok(())
    }

    #[test]
    fn reject_invalid_request_timeout() -> anyhow::Result<()> {
        let cli = parse(&["--request-timeout", "0"])?;
        assert!(cli.validate().is_err());

        let cli = parse(&["--request-timeout", "301"])?;
        assert!(cli.validate().is_err());
        Ok(())
    }

    #[test]
    fn verify_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
