//! Mock session validator for tests and local development.
//!
//! Maps opaque bearer tokens straight to identities, so HTTP tests can act as
//! `user@gmail.com` or `admin@gmail.com` without signing JWTs.
//!
//! # Example
//!
//! ```ignore
//! use tracker_profile::adapters::auth::MockSessionValidator;
//! use tracker_profile::domain::foundation::UserId;
//!
//! let validator = MockSessionValidator::new()
//!     .with_test_user("user-token", UserId::new("user@gmail.com")?);
//!
//! let user = validator.validate("user-token").await?;
//! assert_eq!(user.email, "user@gmail.com");
//! ```

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Mock session validator.
///
/// Tokens not in the map return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    /// Returned for every validation while set
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that maps to a user.
    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.add_token(token, user);
        self
    }

    /// Adds a token for a user whose id doubles as their email address.
    pub fn with_test_user(self, token: impl Into<String>, user_id: UserId) -> Self {
        let email = user_id.as_str().to_string();
        self.with_user(token, AuthenticatedUser::new(user_id, email, None, true))
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self
            .force_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(error);
        self
    }

    /// Registers a new valid token at runtime.
    pub fn add_token(&self, token: impl Into<String>, user: AuthenticatedUser) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.into(), user);
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = self
            .force_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(error);
        }

        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
