//! Signing and verification of individual tokens.
//!
//! Tokens are compact JWS values signed with HS256 over the registered claims
//! `iss`, `sub`, `iat` and `exp`. Verification uses zero leeway: a token is
//! rejected as soon as its `exp` lies in the past.

use jiff::Timestamp;
use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::config::TokenConfig;
use super::error::{TokenError, TokenResult};
use crate::utility::tracing_targets::TRACING_TARGET_TOKENS;

/// Registered JWT claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer (who created the token).
    #[serde(rename = "iss")]
    pub issuer: String,
    /// Subject (who the token was issued for).
    #[serde(rename = "sub")]
    pub subject: String,
    /// Issued at, in Unix seconds.
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Expiration time, in Unix seconds.
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

/// A signed token together with its expiration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    /// Compact serialized token.
    pub value: String,
    /// Expiration time, in Unix seconds.
    pub expires_at: i64,
}

/// Signs a token for `subject`, issued now.
///
/// # Errors
///
/// Returns [`TokenError::Signing`] if the subject is empty or encoding fails.
#[inline]
pub fn sign(subject: &str, config: &TokenConfig) -> TokenResult<SignedToken> {
    sign_at(subject, config, Timestamp::now())
}

/// Signs a token for `subject` as if it were issued at `issued_at`.
///
/// The output is deterministic for identical inputs.
///
/// # Errors
///
/// Returns [`TokenError::Signing`] if the subject is empty, the expiration
/// overflows the supported time range, or encoding fails.
pub fn sign_at(
    subject: &str,
    config: &TokenConfig,
    issued_at: Timestamp,
) -> TokenResult<SignedToken> {
    if subject.trim().is_empty() {
        return Err(TokenError::signing("token subject must not be empty"));
    }

    let expires_at = issued_at
        .checked_add(config.ttl())
        .map_err(|e| TokenError::signing_with_source("token expiration is out of range", e))?;

    let claims = Claims {
        issuer: config.issuer().to_owned(),
        subject: subject.to_owned(),
        issued_at: issued_at.as_second(),
        expires_at: expires_at.as_second(),
    };

    let header = Header::new(Algorithm::HS256);
    let value = encode(&header, &claims, config.encoding_key()).map_err(|e| {
        tracing::error!(
            target: TRACING_TARGET_TOKENS,
            kind = %config.kind(),
            error = %e,
            "failed to encode token"
        );

        TokenError::signing_with_source(format!("cannot encode {} token", config.kind()), e)
    })?;

    Ok(SignedToken {
        value,
        expires_at: claims.expires_at,
    })
}

/// Verifies `token` against `config` and returns its claims.
///
/// Signature, algorithm, issuer and expiry are checked.
///
/// # Errors
///
/// Returns [`TokenError::InvalidToken`] for every failure. The reason is only
/// logged at debug level.
pub fn verify(token: &str, config: &TokenConfig) -> TokenResult<Claims> {
    let validation = validation(config);

    match decode::<Claims>(token, config.decoding_key(), &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) => {
            tracing::debug!(
                target: TRACING_TARGET_TOKENS,
                kind = %config.kind(),
                reason = ?e.kind(),
                "token verification failed"
            );

            Err(TokenError::InvalidToken)
        }
    }
}

fn validation(config: &TokenConfig) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.set_issuer(&[config.issuer()]);
    validation.set_required_spec_claims(&["iss", "sub", "iat", "exp"]);
    validation
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use super::*;
    use crate::service::token::{TokenKind, TokenSecret};

    fn config(secret: &str) -> TokenConfig {
        TokenConfig::new(
            TokenKind::Access,
            "restkit",
            TokenSecret::new(secret),
            SignedDuration::from_mins(15),
        )
        .unwrap()
    }

    #[test]
    fn sign_then_verify_returns_subject() -> anyhow::Result<()> {
        let config = config("access-secret");
        let token = sign("alice@example.com", &config)?;
        let claims = verify(&token.value, &config)?;

        assert_eq!(claims.subject, "alice@example.com");
        assert_eq!(claims.issuer, "restkit");
        assert_eq!(claims.expires_at, token.expires_at);
        assert_eq!(claims.expires_at - claims.issued_at, 15 * 60);
        Ok(())
    }

    #[test]
    fn sign_at_is_deterministic() -> anyhow::Result<()> {
        let config = config("access-secret");
        let issued_at = Timestamp::from_second(1_700_000_000)?;

        let first = sign_at("alice", &config, issued_at)?;
        let second = sign_at("alice", &config, issued_at)?;

        assert_eq!(first, second);
        assert_eq!(first.expires_at, 1_700_000_000 + 15 * 60);
        Ok(())
    }

    #[test]
    fn reject_empty_subject() {
        let error = sign("", &config("access-secret")).unwrap_err();
        assert!(matches!(error, TokenError::Signing { .. }));
    }

    #[test]
    fn expiry_boundary() -> anyhow::Result<()> {
        let config = config("access-secret");
        let ttl = config.ttl();
        let now = Timestamp::now();

        // Expired one second ago.
        let expired = sign_at("alice", &config, now - ttl - SignedDuration::from_secs(1))?;
        assert!(verify(&expired.value, &config).unwrap_err().is_invalid_token());

        // Expires one second from now.
        let fresh = sign_at("alice", &config, now - ttl + SignedDuration::from_secs(1))?;
        assert_eq!(verify(&fresh.value, &config)?.subject, "alice");
        Ok(())
    }

    #[test]
    fn reject_foreign_secret() -> anyhow::Result<()> {
        let token = sign("alice", &config("access-secret"))?;
        let error = verify(&token.value, &config("another-secret")).unwrap_err();

        assert!(error.is_invalid_token());
        Ok(())
    }

    #[test]
    fn reject_foreign_issuer() -> anyhow::Result<()> {
        let other = TokenConfig::new(
            TokenKind::Access,
            "someone-else",
            TokenSecret::new("access-secret"),
            SignedDuration::from_mins(15),
        )?;
        let token = sign("alice", &other)?;

        assert!(verify(&token.value, &config("access-secret")).unwrap_err().is_invalid_token());
        Ok(())
    }

    #[test]
    fn reject_malformed_input() {
        let config = config("access-secret");
        for input in ["", "not-a-token", "a.b.c", "...."] {
            assert!(verify(input, &config).unwrap_err().is_invalid_token(), "{input:?}");
        }
    }

    #[test]
    fn any_single_character_change_is_rejected() -> anyhow::Result<()> {
        let config = config("access-secret");
        let token = sign("alice", &config)?.value;

        for (index, original) in token.char_indices() {
            let replacement = if original == 'A' { 'B' } else { 'A' };
            let mut tampered = token.clone();
            tampered.replace_range(index..index + original.len_utf8(), &replacement.to_string());

            let result = verify(&tampered, &config);
            assert!(
                matches!(result, Err(TokenError::InvalidToken)),
                "tampered position {index} was accepted"
            );
        }
        Ok(())
    }
}
