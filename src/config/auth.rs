//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

const MIN_SECRET_BYTES: usize = 32;

/// Authentication configuration (bearer JWTs)
///
/// Tokens are verified either with a shared HS256 secret or against a
/// JWKS endpoint. Exactly one of the two must be configured.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// Expected `iss` claim
    #[serde(default)]
    pub issuer: String,

    /// Expected `aud` claim
    #[serde(default)]
    pub audience: String,

    /// Shared HS256 signing secret
    pub jwt_secret: Option<SecretString>,

    /// JWKS endpoint for asymmetric keys
    pub jwks_url: Option<String>,

    /// JWKS cache TTL in seconds
    #[serde(default = "default_jwks_cache_ttl")]
    pub jwks_cache_ttl_secs: u64,
}

impl AuthConfig {
    /// Get JWKS cache TTL as Duration
    pub fn jwks_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_cache_ttl_secs)
    }

    /// Validate authentication configuration
    ///
    /// In production the issuer must be an HTTPS URL.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.issuer.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__ISSUER"));
        }
        if self.audience.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__AUDIENCE"));
        }

        if *environment == Environment::Production && !self.issuer.starts_with("https://") {
            return Err(ValidationError::IssuerMustBeHttps);
        }

        let jwks_url = self.jwks_url.as_deref().filter(|u| !u.is_empty());
        match (&self.jwt_secret, jwks_url) {
            (Some(secret), None) => {
                if secret.expose_secret().len() < MIN_SECRET_BYTES {
                    return Err(ValidationError::WeakJwtSecret);
                }
            }
            (None, Some(_)) => {}
            _ => return Err(ValidationError::AmbiguousKeySource),
        }

        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: String::new(),
            audience: String::new(),
            jwt_secret: None,
            jwks_url: None,
            jwks_cache_ttl_secs: default_jwks_cache_ttl(),
        }
    }
}

fn default_jwks_cache_ttl() -> u64 {
    3600
}
