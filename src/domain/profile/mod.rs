//! Profile module - per-user notification preferences and contact links.
//!
//! # Domain Invariants
//!
//! 1. Each profile belongs to exactly one user; ownership never transfers
//! 2. Stored collections hold no blank strings and no blank contact parts
//! 3. Updates replace both collections wholesale, or change nothing at all

mod contact;
mod profile;
mod update;

pub use contact::Contact;
pub use profile::Profile;
pub use update::{
    ContactDraft, ProfileUpdate, ProfileUpdateRequest, ProfileValidationError, CONTACTS_FIELD,
    NOTIFICATION_PREFERENCES_FIELD,
};
