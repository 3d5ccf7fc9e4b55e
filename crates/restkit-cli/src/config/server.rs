//! HTTP server configuration.

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use tokio::net::lookup_host;

use crate::TRACING_TARGET_CONFIG;

/// Port used when `PORT` is unset or empty.
const DEFAULT_PORT: u16 = 4000;

/// Longest accepted graceful shutdown timeout, in seconds.
const MAX_SHUTDOWN_TIMEOUT: u64 = 300;

/// HTTP server configuration.
///
/// # Environment Variables
///
/// - `HOST` - Address or hostname to bind (default: empty, all interfaces)
/// - `PORT` - Port to listen on (default: 4000, also used when empty)
/// - `SHUTDOWN_TIMEOUT` - Graceful shutdown timeout in seconds (default: 30, max: 300)
#[derive(Debug, Clone, Args)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Host address or hostname to bind the server to.
    ///
    /// Binds to every interface when unset or empty.
    #[arg(long, env = "HOST", default_value = "")]
    pub host: String,

    /// TCP port number for the server to listen on.
    #[arg(
        short = 'p',
        long,
        env = "PORT",
        default_value_t = DEFAULT_PORT,
        value_parser = parse_port
    )]
    pub port: u16,

    /// Maximum time in seconds to wait for in-flight requests on shutdown.
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 30)]
    pub shutdown_timeout: u64,
}

/// Parses a port, treating an empty value as the default.
fn parse_port(value: &str) -> Result<u16, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(DEFAULT_PORT);
    }

    value
        .parse()
        .map_err(|e| format!("invalid port `{value}`: {e}"))
}

impl ServerConfig {
    /// Validates all configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if the port is zero or the shutdown timeout is
    /// outside 1-300 seconds.
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.port == 0 {
            return Err(anyhow!("Port must not be 0."));
        }

        if self.shutdown_timeout == 0 || self.shutdown_timeout > MAX_SHUTDOWN_TIMEOUT {
            return Err(anyhow!(
                "Shutdown timeout {} seconds is invalid. Must be between 1 and {MAX_SHUTDOWN_TIMEOUT} seconds.",
                self.shutdown_timeout
            ));
        }

        Ok(())
    }

    /// Returns the host to bind, all interfaces when none is configured.
    #[must_use]
    pub fn bind_host(&self) -> &str {
        match self.host.trim() {
            "" => "0.0.0.0",
            host => host,
        }
    }

    /// Returns `host:port` as configured, for logs and errors.
    #[must_use]
    pub fn bind_address(&self) -> String {
        match self.bind_host().parse::<IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, self.port).to_string(),
            Err(_) => format!("{}:{}", self.bind_host(), self.port),
        }
    }

    /// Resolves the address to bind, looking the host name up if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be resolved.
    pub async fn resolve_addr(&self) -> io::Result<SocketAddr> {
        let mut addrs = lookup_host((self.bind_host(), self.port)).await?;
        addrs.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("host `{}` resolved to no address", self.bind_host()),
            )
        })
    }

    /// Returns the graceful shutdown timeout as a `Duration`.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    /// Returns whether the server binds to all interfaces.
    #[must_use]
    pub fn binds_to_all_interfaces(&self) -> bool {
        self.bind_host()
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_unspecified())
    }

    /// Logs the server configuration.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            addr = %self.bind_address(),
            shutdown_timeout_secs = self.shutdown_timeout,
            "server configuration"
        );
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            shutdown_timeout: 30,
        }
    }
}
