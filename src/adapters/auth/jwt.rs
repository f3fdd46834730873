//! JWT bearer token validator.
//!
//! Implements the `SessionValidator` port for signed JWTs. Two key sources
//! are supported:
//!
//! - a shared HS256 secret, for deployments that sign their own tokens
//! - a JWKS endpoint, for OIDC providers publishing asymmetric keys
//!
//! Issuer, audience and expiry are always checked. The `sub` claim becomes the
//! `UserId` and the `email` claim is mandatory.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{JwkSet, KeyAlgorithm};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::AuthConfig;
use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Claims this service reads from a token.
///
/// `iss`, `aud` and `exp` are checked by `jsonwebtoken` itself.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: String,

    #[serde(default)]
    email: Option<String>,

    #[serde(default)]
    email_verified: Option<bool>,

    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    preferred_username: Option<String>,
}

struct CachedJwks {
    jwks: JwkSet,
    fetched_at: Instant,
}

impl CachedJwks {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() <= ttl
    }
}

enum KeySource {
    Secret(DecodingKey),
    Jwks {
        url: String,
        ttl: Duration,
        client: reqwest::Client,
        cache: Arc<RwLock<Option<CachedJwks>>>,
    },
}

/// Validates bearer JWTs against the configured issuer and audience.
pub struct JwtSessionValidator {
    issuer: String,
    audience: String,
    keys: KeySource,
}

impl JwtSessionValidator {
    /// Validator for HS256 tokens signed with a shared secret.
    pub fn with_secret(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        secret: &[u8],
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            keys: KeySource::Secret(DecodingKey::from_secret(secret)),
        }
    }

    /// Validator that resolves signing keys from a JWKS endpoint.
    ///
    /// Keys are fetched lazily on first use and cached for `ttl`.
    pub fn with_jwks(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        jwks_url: impl Into<String>,
        ttl: Duration,
    ) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(JWKS_FETCH_TIMEOUT)
            .build()
            .map_err(|e| AuthError::service_unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            issuer: issuer.into(),
            audience: audience.into(),
            keys: KeySource::Jwks {
                url: jwks_url.into(),
                ttl,
                client,
                cache: Arc::new(RwLock::new(None)),
            },
        })
    }

    /// Builds a validator from validated auth configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        match (&config.jwt_secret, config.jwks_url.as_deref()) {
            (Some(secret), _) => Ok(Self::with_secret(
                &config.issuer,
                &config.audience,
                secret.expose_secret().as_bytes(),
            )),
            (None, Some(url)) => Self::with_jwks(
                &config.issuer,
                &config.audience,
                url,
                config.jwks_cache_ttl(),
            ),
            (None, None) => Err(AuthError::service_unavailable(
                "no JWT key source configured",
            )),
        }
    }

    async fn resolve_key(&self, header: &Header) -> Result<(DecodingKey, Algorithm), AuthError> {
        match &self.keys {
            KeySource::Secret(key) => Ok((key.clone(), Algorithm::HS256)),
            KeySource::Jwks {
                url,
                ttl,
                client,
                cache,
            } => {
                let kid = header.kid.as_deref().ok_or_else(|| {
                    tracing::warn!("JWT missing 'kid' header");
                    AuthError::InvalidToken
                })?;
                let jwks = jwks(url, *ttl, client, cache).await?;
                let jwk = jwks.find(kid).ok_or_else(|| {
                    tracing::warn!(kid, "No matching key in JWKS");
                    AuthError::InvalidToken
                })?;

                let algorithm = match jwk.common.key_algorithm {
                    Some(KeyAlgorithm::RS256) | None => Algorithm::RS256,
                    Some(KeyAlgorithm::RS384) => Algorithm::RS384,
                    Some(KeyAlgorithm::RS512) => Algorithm::RS512,
                    Some(KeyAlgorithm::ES256) => Algorithm::ES256,
                    Some(KeyAlgorithm::ES384) => Algorithm::ES384,
                    Some(other) => {
                        tracing::warn!("Unsupported JWK algorithm: {:?}", other);
                        return Err(AuthError::InvalidToken);
                    }
                };
                let key = DecodingKey::from_jwk(jwk).map_err(|e| {
                    tracing::warn!("Unusable JWK: {}", e);
                    AuthError::InvalidToken
                })?;
                Ok((key, algorithm))
            }
        }
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation
    }
}

/// Returns the cached key set, refetching once it is older than `ttl`.
async fn jwks(
    url: &str,
    ttl: Duration,
    client: &reqwest::Client,
    cache: &RwLock<Option<CachedJwks>>,
) -> Result<JwkSet, AuthError> {
    if let Some(cached) = cache.read().await.as_ref() {
        if cached.is_fresh(ttl) {
            return Ok(cached.jwks.clone());
        }
    }

    tracing::debug!(url, "Fetching JWKS");
    let response = client.get(url).send().await.map_err(|e| {
        tracing::error!("Failed to fetch JWKS: {}", e);
        AuthError::service_unavailable(format!("JWKS fetch failed: {}", e))
    })?;
    if !response.status().is_success() {
        let status = response.status();
        tracing::error!(%status, "JWKS endpoint returned an error");
        return Err(AuthError::service_unavailable(format!(
            "JWKS endpoint returned {}",
            status
        )));
    }
    let jwks: JwkSet = response.json().await.map_err(|e| {
        tracing::error!("Failed to parse JWKS: {}", e);
        AuthError::service_unavailable(format!("JWKS parse failed: {}", e))
    })?;
    tracing::debug!(keys = jwks.keys.len(), "JWKS refreshed");

    *cache.write().await = Some(CachedJwks {
        jwks: jwks.clone(),
        fetched_at: Instant::now(),
    });
    Ok(jwks)
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!("Failed to decode JWT header: {}", e);
            AuthError::InvalidToken
        })?;

        let (key, algorithm) = self.resolve_key(&header).await?;
        let claims = decode::<TokenClaims>(token, &key, &self.validation(algorithm))
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                _ => {
                    tracing::warn!("Token validation failed: {}", e);
                    AuthError::InvalidToken
                }
            })?
            .claims;

        let email = claims
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| {
                tracing::warn!("Token missing email claim");
                AuthError::InvalidToken
            })?;
        let user_id = UserId::new(claims.sub).map_err(|_| {
            tracing::warn!("Token has blank subject");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(
            user_id,
            email,
            claims.name.or(claims.preferred_username),
            claims.email_verified.unwrap_or(false),
        ))
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match &self.keys {
            KeySource::Secret(_) => "secret",
            KeySource::Jwks { .. } => "jwks",
        };
        f.debug_struct("JwtSessionValidator")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("key_source", &source)
            .finish_non_exhaustive()
    }
}
