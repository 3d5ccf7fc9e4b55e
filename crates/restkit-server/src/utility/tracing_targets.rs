//! Centralized tracing target constants for structured logging.
//!
//! Using consistent targets enables fine-grained control over log output
//! via tracing subscriber filters, e.g. `RUST_LOG=restkit_server::tokens=debug`.

/// Token signing and verification, including pair fork-joins.
pub const TRACING_TARGET_TOKENS: &str = "restkit_server::tokens";

/// Token configuration loading.
pub const TRACING_TARGET_CONFIG: &str = "restkit_server::config";

/// Route registration and request dispatch.
pub const TRACING_TARGET_ROUTER: &str = "restkit_server::router";

/// Per-request access logging.
pub const TRACING_TARGET_REQUEST: &str = "restkit_server::request";

/// Authentication guard decisions and auth handlers.
pub const TRACING_TARGET_AUTHENTICATION: &str = "restkit_server::authentication";

/// Request timeouts and cancelled requests.
pub const TRACING_TARGET_RECOVERY_ERROR: &str = "restkit_server::recovery::error";

/// Panic recovery including handler panics.
pub const TRACING_TARGET_RECOVERY_PANIC: &str = "restkit_server::recovery::panic";
