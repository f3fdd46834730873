//! Profile aggregate root

use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::foundation::{UserId, ValidationError};

use super::contact::{is_blank, Contact};
use super::update::ProfileUpdate;

/// A user's editable profile.
///
/// Owned by exactly one user for its whole life. The two collections are
/// only ever replaced together, through a validated `ProfileUpdate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    owner: UserId,
    notification_preferences: BTreeSet<String>,
    contacts: BTreeSet<Contact>,
}

impl Profile {
    /// An empty profile, as seen on a user's first access.
    pub fn new(owner: UserId) -> Self {
        Self {
            owner,
            notification_preferences: BTreeSet::new(),
            contacts: BTreeSet::new(),
        }
    }

    /// Rebuilds a stored profile, re-checking the non-blank invariant.
    pub fn reconstitute(
        owner: UserId,
        notification_preferences: impl IntoIterator<Item = String>,
        contacts: impl IntoIterator<Item = Contact>,
    ) -> Result<Self, ValidationError> {
        let notification_preferences: BTreeSet<String> =
            notification_preferences.into_iter().collect();
        if notification_preferences.iter().any(|p| is_blank(p)) {
            return Err(ValidationError::empty_field("notification_preferences"));
        }
        Ok(Self {
            owner,
            notification_preferences,
            contacts: contacts.into_iter().collect(),
        })
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn notification_preferences(&self) -> &BTreeSet<String> {
        &self.notification_preferences
    }

    pub fn contacts(&self) -> &BTreeSet<Contact> {
        &self.contacts
    }

    /// Replaces both collections wholesale. The owner is never touched.
    pub fn replace(&mut self, update: ProfileUpdate) {
        let (notification_preferences, contacts) = update.into_parts();
        self.notification_preferences = notification_preferences;
        self.contacts = contacts;
    }
}
