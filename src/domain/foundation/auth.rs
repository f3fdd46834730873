//! Authentication types for the domain layer.
//!
//! `AuthenticatedUser` is the identity every profile operation acts on behalf
//! of. It is populated by a `SessionValidator` adapter and threaded into the
//! application handlers as an explicit argument; nothing in the domain reads a
//! global "current user".

use super::UserId;
use thiserror::Error;

/// Authenticated principal extracted from a validated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The unique user identifier from the auth provider.
    pub id: UserId,

    /// User's email address from the token claims.
    pub email: String,

    /// Display name if available (`name` or `preferred_username` claim).
    pub display_name: Option<String>,

    /// Whether the auth provider has verified the email address.
    pub email_verified: bool,
}

impl AuthenticatedUser {
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        display_name: Option<String>,
        email_verified: bool,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            display_name,
            email_verified,
        }
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token is malformed or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    /// The authentication service is unavailable (network, config, etc.).
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this error indicates the user should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::TokenExpired)
    }
}
