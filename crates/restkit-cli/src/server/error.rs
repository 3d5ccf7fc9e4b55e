//! Server error types.

use std::io;

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Errors raised while binding or running the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address.
    #[error("Failed to bind to {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Runtime server error.
    #[error("Runtime error: {0}")]
    Runtime(#[source] io::Error),
}

impl ServerError {
    /// Creates a bind error with address context.
    pub fn bind_error(address: impl ToString, source: io::Error) -> Self {
        Self::BindError {
            address: address.to_string(),
            source,
        }
    }

    /// Returns a unique error code for this error type.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::BindError { .. } => "E001",
            Self::Runtime(_) => "E002",
        }
    }

    /// Provides a human-readable suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        let kind = match self {
            Self::BindError { source, .. } => source.kind(),
            Self::Runtime(err) => err.kind(),
        };

        match kind {
            io::ErrorKind::PermissionDenied => {
                Some("Try using a port above 1024 or run with appropriate privileges")
            }
            io::ErrorKind::AddrInUse => Some(
                "The port is already in use. Try a different port or stop the conflicting service",
            ),
            io::ErrorKind::AddrNotAvailable => {
                Some("The address is not available. Check network interface configuration")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_unique() {
        let bind_err = ServerError::bind_error("0.0.0.0:4000", io::Error::other("test"));
        let runtime_err = ServerError::Runtime(io::Error::other("test"));

        assert_ne!(bind_err.error_code(), runtime_err.error_code());
    }

    #[test]
    fn address_in_use_has_suggestion() {
        let err = ServerError::bind_error(
            "0.0.0.0:4000",
            io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        );

        assert!(err.suggestion().is_some());
        assert!(err.to_string().contains("0.0.0.0:4000"));
    }

    #[test]
    fn unknown_errors_have_no_suggestion() {
        let err = ServerError::Runtime(io::Error::other("test"));
        assert!(err.suggestion().is_none());
    }
}
