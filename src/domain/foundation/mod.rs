//! Foundation module - Shared domain primitives.
//!
//! Identifiers, the authenticated principal, and the error vocabulary used by
//! every layer of the service.

mod auth;
mod errors;
mod ids;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, FieldViolation, ValidationError, ViolatedRule};
pub use ids::UserId;
