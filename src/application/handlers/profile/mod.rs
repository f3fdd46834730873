//! Profile application handlers.
//!
//! Query and command handlers for reading and replacing a user's profile.

mod get_profile;
mod update_profile;

pub use get_profile::{GetProfileHandler, GetProfileQuery};
pub use update_profile::{UpdateProfileCommand, UpdateProfileHandler};
