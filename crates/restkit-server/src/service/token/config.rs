//! Per-kind token configuration.
//!
//! A [`TokenConfigs`] set is built once at startup. Every failure here is a
//! deployment problem, so loading fails fast with a [`Config`] error instead
//! of falling back to defaults.
//!
//! [`Config`]: crate::ErrorKind::Config

use std::fmt;
use std::sync::Arc;

use jiff::SignedDuration;
use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::utility::tracing_targets::TRACING_TARGET_CONFIG;
use crate::{Error, Result};

/// The kind of a token; each kind is signed with its own secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum TokenKind {
    Id,
    Access,
    Refresh,
}

/// Symmetric signing secret.
///
/// The bytes are never printed: `Debug` output is redacted.
#[derive(Clone)]
pub struct TokenSecret(Arc<[u8]>);

impl TokenSecret {
    /// Wraps raw secret bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Arc::from(bytes.into()))
    }

    /// Returns the secret bytes.
    #[inline]
    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    /// Returns `true` if the secret has no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenSecret(<redacted>)")
    }
}

/// Raw, unparsed settings for one token kind, as read from the environment.
#[derive(Clone, Copy)]
pub struct TokenSource<'a> {
    /// Signing secret.
    pub secret: &'a str,
    /// Lifetime, e.g. `15m`, `1h30m`, `24h` or `PT15M`.
    pub expiration: &'a str,
}

impl<'a> TokenSource<'a> {
    /// Creates a new token source.
    #[inline]
    pub const fn new(secret: &'a str, expiration: &'a str) -> Self {
        Self { secret, expiration }
    }
}

impl fmt::Debug for TokenSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSource")
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}

/// Issuer, secret and lifetime of one token kind, with derived HMAC keys.
pub struct TokenConfig {
    kind: TokenKind,
    issuer: Arc<str>,
    secret: TokenSecret,
    ttl: SignedDuration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenConfig {
    /// Creates a validated token configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the issuer or secret is empty, or if
    /// the lifetime is not strictly positive.
    pub fn new(
        kind: TokenKind,
        issuer: &str,
        secret: TokenSecret,
        ttl: SignedDuration,
    ) -> Result<Self> {
        if issuer.trim().is_empty() {
            return Err(Error::config("token issuer must not be empty"));
        }

        if secret.is_empty() {
            return Err(Error::config(format!("{kind} token secret is missing")));
        }

        if !ttl.is_positive() {
            return Err(Error::config(format!(
                "{kind} token expiration must be positive, got {ttl:#}"
            )));
        }

        let encoding_key = EncodingKey::from_secret(secret.expose());
        let decoding_key = DecodingKey::from_secret(secret.expose());

        Ok(Self {
            kind,
            issuer: Arc::from(issuer),
            secret,
            ttl,
            encoding_key,
            decoding_key,
        })
    }

    /// Parses a token configuration from raw settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the expiration cannot be parsed as a
    /// duration, or if [`TokenConfig::new`] rejects the values.
    pub fn from_source(kind: TokenKind, issuer: &str, source: TokenSource<'_>) -> Result<Self> {
        let ttl = parse_ttl(kind, source.expiration)?;
        Self::new(kind, issuer, TokenSecret::new(source.secret), ttl)
    }

    /// Returns the token kind.
    #[inline]
    pub const fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Returns the issuer placed in the `iss` claim.
    #[inline]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the token lifetime.
    #[inline]
    pub const fn ttl(&self) -> SignedDuration {
        self.ttl
    }

    /// Returns the HMAC signing key.
    #[inline]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Returns the HMAC verification key.
    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("kind", &self.kind)
            .field("issuer", &self.issuer)
            .field("secret", &self.secret)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Configuration of every token kind.
#[derive(Debug)]
pub struct TokenConfigs {
    pub id: TokenConfig,
    pub access: TokenConfig,
    pub refresh: TokenConfig,
}

impl TokenConfigs {
    /// Loads the configuration of all token kinds sharing a single issuer.
    ///
    /// # Errors
    ///
    /// Returns a configuration error on the first kind whose secret is
    /// missing or whose expiration is unparseable or non-positive.
    pub fn load(
        issuer: &str,
        id: TokenSource<'_>,
        access: TokenSource<'_>,
        refresh: TokenSource<'_>,
    ) -> Result<Self> {
        let configs = Self {
            id: TokenConfig::from_source(TokenKind::Id, issuer, id)?,
            access: TokenConfig::from_source(TokenKind::Access, issuer, access)?,
            refresh: TokenConfig::from_source(TokenKind::Refresh, issuer, refresh)?,
        };

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            issuer = issuer,
            id_ttl = %configs.id.ttl(),
            access_ttl = %configs.access.ttl(),
            refresh_ttl = %configs.refresh.ttl(),
            "token configuration loaded"
        );

        Ok(configs)
    }

    /// Returns the configuration for `kind`.
    #[inline]
    pub const fn get(&self, kind: TokenKind) -> &TokenConfig {
        match kind {
            TokenKind::Id => &self.id,
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}

/// Parses a lifetime in either the compact friendly format (`1h30m`) or ISO 8601.
fn parse_ttl(kind: TokenKind, expiration: &str) -> Result<SignedDuration> {
    let expiration = expiration.trim();
    if expiration.is_empty() {
        return Err(Error::config(format!("{kind} token expiration is missing")));
    }

    expiration.parse::<SignedDuration>().map_err(|e| {
        Error::config(format!(
            "{kind} token expiration `{expiration}` is not a valid duration"
        ))
        .with_source(e)
    })
}
