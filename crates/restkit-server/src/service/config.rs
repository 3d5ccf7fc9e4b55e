//! Service configuration.

use std::fmt;

#[cfg(feature = "config")]
use clap::Args;
use serde::Deserialize;

use crate::Result;
use crate::service::token::{TokenConfigs, TokenSource};

/// App [`state`] configuration.
///
/// Every value is required: a missing secret or expiration is a startup
/// failure, never a silent default.
///
/// [`state`]: crate::service::ServiceState
#[derive(Clone, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Issuer placed in the `iss` claim of every token.
    #[cfg_attr(feature = "config", arg(long = "jwt-issuer", env = "JWT_ISSUER"))]
    pub jwt_issuer: String,

    /// Secret used to sign id tokens.
    #[cfg_attr(
        feature = "config",
        arg(long = "jwt-id-token-secret", env = "JWT_ID_TOKEN_SECRET", hide_env_values = true)
    )]
    pub id_token_secret: String,

    /// Lifetime of id tokens, e.g. `1h`.
    #[cfg_attr(
        feature = "config",
        arg(long = "jwt-id-token-expiration", env = "JWT_ID_TOKEN_EXPIRATION")
    )]
    pub id_token_expiration: String,

    /// Secret used to sign access tokens.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "jwt-access-token-secret",
            env = "JWT_ACCESS_TOKEN_SECRET",
            hide_env_values = true
        )
    )]
    pub access_token_secret: String,

    /// Lifetime of access tokens, e.g. `15m`.
    #[cfg_attr(
        feature = "config",
        arg(long = "jwt-access-token-expiration", env = "JWT_ACCESS_TOKEN_EXPIRATION")
    )]
    pub access_token_expiration: String,

    /// Secret used to sign refresh tokens.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "jwt-refresh-token-secret",
            env = "JWT_REFRESH_TOKEN_SECRET",
            hide_env_values = true
        )
    )]
    pub refresh_token_secret: String,

    /// Lifetime of refresh tokens, e.g. `24h`.
    #[cfg_attr(
        feature = "config",
        arg(long = "jwt-refresh-token-expiration", env = "JWT_REFRESH_TOKEN_EXPIRATION")
    )]
    pub refresh_token_expiration: String,
}

impl ServiceConfig {
    /// Parses and validates the configuration of every token kind.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a secret is missing or an expiration
    /// is invalid.
    pub fn load_tokens(&self) -> Result<TokenConfigs> {
        TokenConfigs::load(
            &self.jwt_issuer,
            TokenSource::new(&self.id_token_secret, &self.id_token_expiration),
            TokenSource::new(&self.access_token_secret, &self.access_token_expiration),
            TokenSource::new(&self.refresh_token_secret, &self.refresh_token_expiration),
        )
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("id_token_expiration", &self.id_token_expiration)
            .field("access_token_expiration", &self.access_token_expiration)
            .field("refresh_token_expiration", &self.refresh_token_expiration)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn config() -> ServiceConfig {
        ServiceConfig {
            jwt_issuer: "restkit".to_owned(),
            id_token_secret: "id-secret".to_owned(),
            id_token_expiration: "1h".to_owned(),
            access_token_secret: "access-secret".to_owned(),
            access_token_expiration: "15m".to_owned(),
            refresh_token_secret: "refresh-secret".to_owned(),
            refresh_token_expiration: "24h".to_owned(),
        }
    }

    #[test]
    fn load_tokens_from_config() -> anyhow::Result<()> {
        let tokens = config().load_tokens()?;
        assert_eq!(tokens.refresh.issuer(), "restkit");
        Ok(())
    }

    #[test]
    fn missing_secret_is_a_config_error() {
        let config = ServiceConfig {
            refresh_token_secret: String::new(),
            ..config()
        };

        assert_eq!(config.load_tokens().unwrap_err().kind(), ErrorKind::Config);
    }

    #[test]
    fn debug_hides_secrets() {
        let debug = format!("{:?}", config());
        assert!(!debug.contains("access-secret"));
        assert!(debug.contains("15m"));
    }
}
