//! Tracker Profile - user profile API for the issue tracker
//!
//! An authenticated user reads and replaces their own notification
//! preferences and contact links. Updates are validated as a whole before
//! anything is stored.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
