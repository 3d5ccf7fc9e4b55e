//! Application state and dependency injection.

mod config;
pub mod token;

pub use crate::service::config::ServiceConfig;
pub use crate::service::token::TokenManager;
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

/// Application state.
///
/// Cloned into every handler and middleware that needs it.
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    pub tokens: TokenManager,
}

impl ServiceState {
    /// Creates the state from already constructed services.
    pub fn new(tokens: TokenManager) -> Self {
        Self { tokens }
    }

    /// Initializes application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any token setting is invalid.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let tokens = TokenManager::new(config.load_tokens()?);
        Ok(Self::new(tokens))
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(tokens: TokenManager);
