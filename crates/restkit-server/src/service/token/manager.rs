use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::codec::{self, Claims, SignedToken};
use super::config::{TokenConfigs, TokenKind};
use super::error::TokenResult;
use super::fork_join::fork_join;
use crate::utility::tracing_targets::TRACING_TARGET_TOKENS;

/// Access and refresh tokens issued or verified together.
///
/// A pair only exists with both members: if either leg fails, no pair is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "AuthTokenPairBody", from = "AuthTokenPairBody")]
pub struct AuthTokenPair {
    pub access: SignedToken,
    pub refresh: SignedToken,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthTokenPairBody {
    access_token: String,
    access_token_expires_at: i64,
    refresh_token: String,
    refresh_token_expires_at: i64,
}

impl From<AuthTokenPair> for AuthTokenPairBody {
    fn from(pair: AuthTokenPair) -> Self {
        Self {
            access_token: pair.access.value,
            access_token_expires_at: pair.access.expires_at,
            refresh_token: pair.refresh.value,
            refresh_token_expires_at: pair.refresh.expires_at,
        }
    }
}

impl From<AuthTokenPairBody> for AuthTokenPair {
    fn from(body: AuthTokenPairBody) -> Self {
        Self {
            access: SignedToken {
                value: body.access_token,
                expires_at: body.access_token_expires_at,
            },
            refresh: SignedToken {
                value: body.refresh_token,
                expires_at: body.refresh_token_expires_at,
            },
        }
    }
}

/// A signed id token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "IdTokenBody", from = "IdTokenBody")]
pub struct IdToken(pub SignedToken);

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdTokenBody {
    id_token: String,
    id_token_expires_at: i64,
}

impl From<IdToken> for IdTokenBody {
    fn from(IdToken(token): IdToken) -> Self {
        Self {
            id_token: token.value,
            id_token_expires_at: token.expires_at,
        }
    }
}

impl From<IdTokenBody> for IdToken {
    fn from(body: IdTokenBody) -> Self {
        Self(SignedToken {
            value: body.id_token,
            expires_at: body.id_token_expires_at,
        })
    }
}

/// Issues and verifies tokens of every kind.
///
/// Cheap to clone: configuration is shared behind an [`Arc`].
#[derive(Debug, Clone)]
pub struct TokenManager {
    configs: Arc<TokenConfigs>,
}

impl TokenManager {
    /// Creates a new token manager.
    pub fn new(configs: TokenConfigs) -> Self {
        Self {
            configs: Arc::new(configs),
        }
    }

    /// Signs an access and a refresh token for `subject` in parallel.
    ///
    /// # Errors
    ///
    /// Returns the access leg's error if it failed, otherwise the refresh
    /// leg's error, or [`TokenError::Cancelled`] if `cancel` fires first.
    ///
    /// [`TokenError::Cancelled`]: super::TokenError::Cancelled
    pub async fn issue_pair(
        &self,
        subject: &str,
        cancel: &CancellationToken,
    ) -> TokenResult<AuthTokenPair> {
        let (access_configs, refresh_configs) = (self.configs.clone(), self.configs.clone());
        let (access_subject, refresh_subject) = (subject.to_owned(), subject.to_owned());

        let (access, refresh) = fork_join(
            cancel,
            move || codec::sign(&access_subject, &access_configs.access),
            move || codec::sign(&refresh_subject, &refresh_configs.refresh),
        )
        .await?;

        tracing::debug!(
            target: TRACING_TARGET_TOKENS,
            access_expires_at = access.expires_at,
            refresh_expires_at = refresh.expires_at,
            "token pair issued"
        );

        Ok(AuthTokenPair { access, refresh })
    }

    /// Verifies an access and a refresh token in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidToken`] if either token fails
    /// verification, or [`TokenError::Cancelled`] if `cancel` fires first.
    ///
    /// [`TokenError::InvalidToken`]: super::TokenError::InvalidToken
    /// [`TokenError::Cancelled`]: super::TokenError::Cancelled
    pub async fn verify_pair(
        &self,
        access: &str,
        refresh: &str,
        cancel: &CancellationToken,
    ) -> TokenResult<AuthTokenPair> {
        let (access_configs, refresh_configs) = (self.configs.clone(), self.configs.clone());
        let (access, refresh) = (access.to_owned(), refresh.to_owned());

        let (access, refresh) = fork_join(
            cancel,
            move || verify_into_signed(access, &access_configs, TokenKind::Access),
            move || verify_into_signed(refresh, &refresh_configs, TokenKind::Refresh),
        )
        .await?;

        Ok(AuthTokenPair { access, refresh })
    }

    /// Signs an id token for `subject`.
    pub fn issue_id_token(&self, subject: &str) -> TokenResult<IdToken> {
        codec::sign(subject, &self.configs.id).map(IdToken)
    }

    /// Verifies an id token.
    pub fn verify_id_token(&self, token: &str) -> TokenResult<Claims> {
        codec::verify(token, &self.configs.id)
    }

    /// Verifies an access token.
    pub fn verify_access_token(&self, token: &str) -> TokenResult<Claims> {
        codec::verify(token, &self.configs.access)
    }

    /// Verifies a refresh token.
    pub fn verify_refresh_token(&self, token: &str) -> TokenResult<Claims> {
        codec::verify(token, &self.configs.refresh)
    }
}

fn verify_into_signed(
    value: String,
    configs: &TokenConfigs,
    kind: TokenKind,
) -> TokenResult<SignedToken> {
    let claims = codec::verify(&value, configs.get(kind))?;
    Ok(SignedToken {
        value,
        expires_at: claims.expires_at,
    })
}

#[cfg(test)]
impl TokenManager {
    /// Manager with short fixed secrets for unit tests.
    pub(crate) fn for_tests() -> Self {
        use super::config::TokenSource;

        let configs = TokenConfigs::load(
            "restkit-test",
            TokenSource::new("id-secret", "1h"),
            TokenSource::new("access-secret", "15m"),
            TokenSource::new("refresh-secret", "24h"),
        )
        .expect("test token configuration is valid");

        Self::new(configs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::token::TokenError;

    #[tokio::test]
    async fn issued_pair_verifies() -> anyhow::Result<()> {
        let manager = TokenManager::for_tests();
        let cancel = CancellationToken::new();

        let pair = manager.issue_pair("alice@example.com", &cancel).await?;
        let verified = manager
            .verify_pair(&pair.access.value, &pair.refresh.value, &cancel)
            .await?;

        assert_eq!(verified, pair);
        Ok(())
    }

    #[tokio::test]
    async fn pair_members_share_subject() -> anyhow::Result<()> {
        let manager = TokenManager::for_tests();
        let pair = manager.issue_pair("alice", &CancellationToken::new()).await?;

        let access = manager.verify_access_token(&pair.access.value)?;
        let refresh = manager.verify_refresh_token(&pair.refresh.value)?;

        assert_eq!(access.subject, "alice");
        assert_eq!(refresh.subject, "alice");
        assert_eq!(refresh.expires_at - access.expires_at, 24 * 3600 - 15 * 60);
        Ok(())
    }

    #[tokio::test]
    async fn empty_subject_yields_no_pair() {
        let manager = TokenManager::for_tests();
        let result = manager.issue_pair("", &CancellationToken::new()).await;

        assert!(matches!(result, Err(TokenError::Signing { .. })));
    }

    #[tokio::test]
    async fn swapped_tokens_fail_verification() -> anyhow::Result<()> {
        let manager = TokenManager::for_tests();
        let cancel = CancellationToken::new();
        let pair = manager.issue_pair("alice", &cancel).await?;

        let result = manager
            .verify_pair(&pair.refresh.value, &pair.access.value, &cancel)
            .await;

        assert!(matches!(result, Err(TokenError::InvalidToken)));
        Ok(())
    }

    #[tokio::test]
    async fn one_invalid_member_invalidates_pair() -> anyhow::Result<()> {
        let manager = TokenManager::for_tests();
        let cancel = CancellationToken::new();
        let pair = manager.issue_pair("alice", &cancel).await?;

        let result = manager
            .verify_pair(&pair.access.value, "garbage", &cancel)
            .await;

        assert!(matches!(result, Err(TokenError::InvalidToken)));
        Ok(())
    }

    #[tokio::test]
    async fn cancelled_issue_returns_cancelled() {
        let manager = TokenManager::for_tests();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = manager.issue_pair("alice", &cancel).await;
        assert!(matches!(result, Err(TokenError::Cancelled)));
    }

    #[test]
    fn id_token_round_trip() -> anyhow::Result<()> {
        let manager = TokenManager::for_tests();
        let IdToken(token) = manager.issue_id_token("alice")?;

        assert_eq!(manager.verify_id_token(&token.value)?.subject, "alice");
        assert!(manager.verify_access_token(&token.value).is_err());
        Ok(())
    }

    #[test]
    fn pair_wire_shape() -> anyhow::Result<()> {
        let pair = AuthTokenPair {
            access: SignedToken {
                value: "a".into(),
                expires_at: 10,
            },
            refresh: SignedToken {
                value: "r".into(),
                expires_at: 20,
            },
        };

        let json = serde_json::to_value(&pair)?;
        assert_eq!(
            json,
            serde_json::json!({
                "accessToken": "a",
                "accessTokenExpiresAt": 10,
                "refreshToken": "r",
                "refreshTokenExpiresAt": 20,
            })
        );

        let back: AuthTokenPair = serde_json::from_value(json)?;
        assert_eq!(back, pair);
        Ok(())
    }

    #[test]
    fn id_token_wire_shape() -> anyhow::Result<()> {
        let token = IdToken(SignedToken {
            value: "i".into(),
            expires_at: 5,
        });

        let json = serde_json::to_value(&token)?;
        assert_eq!(json, serde_json::json!({ "idToken": "i", "idTokenExpiresAt": 5 }));
        Ok(())
    }
}
