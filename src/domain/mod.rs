//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (identifiers, auth principal, errors)
//! - `profile` - Profile aggregate and its update validation

pub mod foundation;
pub mod profile;
