//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Bearer token validators (JWT, mock)
//! - `http` - axum REST API
//! - `profile` - Profile storage (PostgreSQL, in-memory)

pub mod auth;
pub mod http;
pub mod profile;
