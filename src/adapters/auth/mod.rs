//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` port:
//!
//! - `jwt` - Signed bearer tokens (shared HS256 secret or JWKS)
//! - `mock` - Token-to-identity map for tests and local development

mod jwt;
mod mock;

pub use jwt::JwtSessionValidator;
pub use mock::MockSessionValidator;
