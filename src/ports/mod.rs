//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ProfileRepository` - Profile persistence (Postgres, in-memory)
//! - `SessionValidator` - Bearer token validation (JWT, mock)

mod profile_repository;
mod session_validator;

pub use profile_repository::ProfileRepository;
pub use session_validator::SessionValidator;
