//! Profile storage adapters

mod in_memory;
mod postgres;

pub use in_memory::InMemoryProfileRepository;
pub use postgres::PostgresProfileRepository;
